//! Flutter-facing bindings for the Redação core.

pub mod api;
