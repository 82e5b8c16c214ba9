//! Essay record store over a key-value storage capability.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete/reset over one collection blob.
//! - Serialize concurrent mutations so no write is silently lost.
//!
//! # Invariants
//! - Every mutation holds the mutation gate from its read until its write
//!   completes; at most one writer is in flight per store.
//! - A failed write leaves the persisted collection unchanged.
//! - `delete` of an unknown id performs no write.

use crate::model::essay::{decode_collection, encode_collection, EssayId, EssayRecord};
use crate::storage::{KeyValueStorage, StorageError};
use async_trait::async_trait;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::Mutex;

/// Fixed storage key the app has always used for the collection.
pub const DEFAULT_STORAGE_KEY: &str = "redacoes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    /// Persisted blob cannot be read or is not a valid collection.
    StorageRead { key: String, message: String },
    /// Underlying write failed; the mutation was not applied.
    StorageWrite(StorageError),
    /// `update` targeted an id that is not in the collection.
    NotFound(EssayId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageRead { key, message } => {
                write!(f, "essay collection `{key}` is unreadable: {message}")
            }
            Self::StorageWrite(err) => write!(f, "essay collection write failed: {err}"),
            Self::NotFound(id) => write!(f, "essay not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageWrite(err) => Some(err),
            Self::StorageRead { .. } | Self::NotFound(_) => None,
        }
    }
}

/// Repository interface for essay persistence.
#[async_trait]
pub trait EssayRepository: Send + Sync {
    /// Returns all essays in insertion order.
    async fn list_all(&self) -> StoreResult<Vec<EssayRecord>>;
    /// Returns one essay by id.
    async fn get(&self, id: &EssayId) -> StoreResult<Option<EssayRecord>>;
    /// Appends a new essay with a fresh id and returns it.
    async fn create(&self, title: &str, body: &str) -> StoreResult<EssayRecord>;
    /// Replaces title and body of an existing essay in place.
    async fn update(&self, id: &EssayId, title: &str, body: &str) -> StoreResult<EssayRecord>;
    /// Removes an essay; unknown ids are a no-op.
    async fn delete(&self, id: &EssayId) -> StoreResult<()>;
    /// Overwrites the collection with an empty one.
    async fn reset(&self) -> StoreResult<()>;
}

/// Essay store bound to one storage key.
pub struct EssayStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    mutation_gate: Mutex<()>,
}

impl<S: KeyValueStorage> EssayStore<S> {
    /// Creates a store over `storage` using the default `redacoes` key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Creates a store over `storage` using a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            mutation_gate: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> StoreResult<Vec<EssayRecord>> {
        let blob = match self.storage.get(&self.key).await {
            Ok(blob) => blob,
            Err(err) => {
                error!(
                    "event=essay_load module=repo status=error error_code=storage_get_failed error={err}"
                );
                return Err(StoreError::StorageRead {
                    key: self.key.clone(),
                    message: err.to_string(),
                });
            }
        };

        let Some(blob) = blob else {
            return Ok(Vec::new());
        };

        decode_collection(&blob).map_err(|err| {
            warn!(
                "event=essay_load module=repo status=error error_code=collection_corrupt blob_len={} error={err}",
                blob.len()
            );
            StoreError::StorageRead {
                key: self.key.clone(),
                message: err.to_string(),
            }
        })
    }

    async fn persist(&self, records: &[EssayRecord]) -> StoreResult<()> {
        let blob = encode_collection(records);
        self.storage.set(&self.key, &blob).await.map_err(|err| {
            error!(
                "event=essay_persist module=repo status=error error_code=storage_set_failed count={} error={err}",
                records.len()
            );
            StoreError::StorageWrite(err)
        })?;
        debug!(
            "event=essay_persist module=repo status=ok count={} blob_len={}",
            records.len(),
            blob.len()
        );
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStorage> EssayRepository for EssayStore<S> {
    async fn list_all(&self) -> StoreResult<Vec<EssayRecord>> {
        self.load().await
    }

    async fn get(&self, id: &EssayId) -> StoreResult<Option<EssayRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|record| &record.id == id))
    }

    async fn create(&self, title: &str, body: &str) -> StoreResult<EssayRecord> {
        let _gate = self.mutation_gate.lock().await;
        let mut records = self.load().await?;

        let mut id = EssayId::generate();
        while records.iter().any(|record| record.id == id) {
            id = EssayId::generate();
        }

        let record = EssayRecord::with_id(id, title, body);
        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    async fn update(&self, id: &EssayId, title: &str, body: &str) -> StoreResult<EssayRecord> {
        let _gate = self.mutation_gate.lock().await;
        let mut records = self.load().await?;

        let Some(target) = records.iter_mut().find(|record| &record.id == id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        target.title = title.to_string();
        target.body = body.to_string();
        let updated = target.clone();

        self.persist(&records).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &EssayId) -> StoreResult<()> {
        let _gate = self.mutation_gate.lock().await;
        let mut records = self.load().await?;

        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            return Ok(());
        }

        self.persist(&records).await
    }

    async fn reset(&self) -> StoreResult<()> {
        let _gate = self.mutation_gate.lock().await;
        self.persist(&[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::{EssayRepository, EssayStore, StoreError, DEFAULT_STORAGE_KEY};
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn default_key_is_redacoes() {
        let store = EssayStore::new(MemoryStorage::new());
        assert_eq!(store.key(), DEFAULT_STORAGE_KEY);
        assert_eq!(store.key(), "redacoes");
    }

    #[tokio::test]
    async fn create_writes_wire_format_under_key() {
        let store = EssayStore::with_key(MemoryStorage::new(), "custom");
        let created = store.create("A", "x").await.unwrap();

        let raw = store.storage().raw("custom").await.unwrap();
        assert!(raw.contains(&format!(r#""id":"{}""#, created.id)));
        assert!(raw.contains(r#""titulo":"A""#));
        assert!(raw.contains(r#""texto":"x""#));
        assert!(store.storage().raw(DEFAULT_STORAGE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_does_not_write() {
        let store = EssayStore::new(MemoryStorage::new());
        let missing = crate::EssayId::generate();
        store.delete(&missing).await.unwrap();
        assert!(store.storage().raw(DEFAULT_STORAGE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = EssayStore::new(MemoryStorage::new());
        let missing = crate::EssayId::generate();
        let err = store.update(&missing, "t", "b").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    }
}
