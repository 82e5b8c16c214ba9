//! Local search over fetched reference data.
//!
//! # Responsibility
//! - Filter the synonym dictionary served by `/sinonimos`.

pub mod synonyms;
