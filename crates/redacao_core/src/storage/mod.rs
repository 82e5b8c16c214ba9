//! Key-value storage capability consumed by the essay store.
//!
//! # Responsibility
//! - Define the async `get`/`set` contract over string values.
//! - Provide in-memory, file and SQLite implementations.
//!
//! # Invariants
//! - `set` either fully replaces the value or fails; readers never observe a
//!   partially written value.
//! - An absent key reads as `None`, never as an error.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, KV_SCHEMA_VERSION};

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend failure raised by a storage capability.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build with an unknown schema.
    UnsupportedSchema { found: u32, supported: u32 },
    /// Blocking worker for a synchronous backend did not complete.
    Worker(String),
    /// Stored bytes are not valid UTF-8 text.
    InvalidText(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage io error: {err}"),
            Self::Sqlite(err) => write!(f, "storage sqlite error: {err}"),
            Self::UnsupportedSchema { found, supported } => write!(
                f,
                "storage schema version {found} is newer than supported {supported}"
            ),
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
            Self::InvalidText(key) => write!(f, "stored value for `{key}` is not valid UTF-8"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchema { .. } | Self::Worker(_) | Self::InvalidText(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Async string key-value storage provided by the host platform.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

#[async_trait]
impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value).await
    }
}
