//! Essay domain model.
//!
//! # Responsibility
//! - Define the canonical essay record and its collection wire format.
//! - Model the remote payload shapes that feed store operations.
//!
//! # Invariants
//! - Every essay is identified by a stable `EssayId`.
//! - Deletion is a hard remove; there are no tombstones.

pub mod essay;
pub mod template;
