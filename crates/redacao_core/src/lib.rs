//! Core domain logic for the Redação essay app.
//! This crate owns the essay store and its consistency rules.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;

pub use config::{BackendKind, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::essay::{EssayId, EssayRecord};
pub use model::template::EssayTemplate;
pub use repo::essay_repo::{
    EssayRepository, EssayStore, StoreError, StoreResult, DEFAULT_STORAGE_KEY,
};
pub use search::synonyms::{SynonymHit, SynonymIndex};
pub use service::essay_service::{
    check_draft_length, display_title, export_file_name, DraftLength, EssayService,
    ExportedEssay, ServiceError, ServiceResult, DRAFT_SOFT_LIMIT_CHARS,
};
pub use storage::{
    FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult,
    KV_SCHEMA_VERSION,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
