//! Repository layer: the essay record store.
//!
//! # Responsibility
//! - Define the use-case oriented essay data access contract.
//! - Keep collection encoding and storage I/O out of the service layer.
//!
//! # Invariants
//! - Mutations are read-modify-write over the whole collection blob and are
//!   serialized per store instance.
//! - Corrupt persisted data is reported, never masked as an empty list.

pub mod essay_repo;
