//! Store configuration.
//!
//! # Responsibility
//! - Describe where and how the essay collection is persisted.
//! - Resolve overrides from environment variables.
//!
//! # Invariants
//! - `storage_key` is never blank.
//! - Unknown backend names are rejected instead of silently defaulted.

use crate::repo::essay_repo::{EssayStore, DEFAULT_STORAGE_KEY};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage, StorageResult};
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_DATA_DIR: &str = "REDACAO_DATA_DIR";
pub const ENV_STORAGE_KEY: &str = "REDACAO_STORAGE_KEY";
pub const ENV_BACKEND: &str = "REDACAO_BACKEND";

const DEFAULT_DATA_DIR_NAME: &str = "redacao";
const SQLITE_FILE_NAME: &str = "redacao.sqlite3";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Sqlite,
    Memory,
}

impl BackendKind {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unsupported storage backend `{other}`; expected file|sqlite|memory"
            )),
        }
    }
}

/// Where the essay collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub backend: BackendKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            backend: BackendKind::File,
        }
    }
}

impl StoreConfig {
    /// Builds config from defaults plus `REDACAO_*` environment overrides.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(dir) = non_blank(lookup(ENV_DATA_DIR)) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = non_blank(lookup(ENV_STORAGE_KEY)) {
            config.storage_key = key;
        }
        if let Some(backend) = non_blank(lookup(ENV_BACKEND)) {
            config.backend = BackendKind::parse(&backend)?;
        }

        Ok(config)
    }

    /// Opens the configured backend and binds a store to the configured key.
    pub async fn open_store(&self) -> StorageResult<EssayStore<Arc<dyn KeyValueStorage>>> {
        let storage: Arc<dyn KeyValueStorage> = match self.backend {
            BackendKind::File => Arc::new(FileStorage::open(&self.data_dir).await?),
            BackendKind::Sqlite => {
                tokio::fs::create_dir_all(&self.data_dir).await?;
                Arc::new(SqliteStorage::open(self.data_dir.join(SQLITE_FILE_NAME)).await?)
            }
            BackendKind::Memory => Arc::new(MemoryStorage::new()),
        };
        Ok(EssayStore::with_key(storage, self.storage_key.clone()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
