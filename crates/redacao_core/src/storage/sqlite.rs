//! SQLite-backed key-value storage.
//!
//! # Responsibility
//! - Keep every key-value pair as one row of the `kv_store` table.
//! - Bring older database files up to the current `kv_store` schema
//!   without touching rows already stored.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`; files from a newer
//!   build are refused instead of being rewritten.
//! - Every call runs on the blocking pool; the connection is never touched
//!   from an async worker thread directly.

use super::{KeyValueStorage, StorageError, StorageResult};
use async_trait::async_trait;
use log::{error, info};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Version written to `PRAGMA user_version` once `kv_store` exists.
pub const KV_SCHEMA_VERSION: u32 = 1;

const CREATE_KV_STORE_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);";

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Opens a database file, creating `kv_store` when needed.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let conn = tokio::task::spawn_blocking(move || {
            open_logged("file", || {
                let conn = Connection::open(&path)?;
                // journal_mode returns a row, so it cannot go through execute_batch.
                let _: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
                Ok(conn)
            })
        })
        .await
        .map_err(|err| StorageError::Worker(err.to_string()))??;
        Ok(Self::wrap(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = open_logged("memory", || Ok(Connection::open_in_memory()?))?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, job: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            job(&guard)
        })
        .await
        .map_err(|err| StorageError::Worker(err.to_string()))?
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.run(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }
}

/// Opens a connection and prepares `kv_store`, emitting `kv_open` events.
fn open_logged(
    mode: &'static str,
    open: impl FnOnce() -> StorageResult<Connection>,
) -> StorageResult<Connection> {
    let started_at = Instant::now();
    let result = open().and_then(|mut conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        prepare_kv_schema(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=kv_open module=storage status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=kv_open module=storage status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

/// Creates `kv_store` on unversioned files and stamps the schema version.
///
/// An unversioned file that already carries a `kv_store` table keeps its
/// rows; the create statement is a no-op there.
fn prepare_kv_schema(conn: &mut Connection) -> StorageResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > KV_SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchema {
            found,
            supported: KV_SCHEMA_VERSION,
        });
    }
    if found == KV_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_KV_STORE_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {KV_SCHEMA_VERSION};"))?;
    tx.commit()?;
    info!("event=kv_schema module=storage status=ok from_version={found} to_version={KV_SCHEMA_VERSION}");
    Ok(())
}
