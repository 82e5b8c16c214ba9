//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the use cases the screens perform.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod essay_service;
