//! File-per-key storage in a data directory.
//!
//! # Invariants
//! - Each key maps to `<data_dir>/<encoded key>.json`; distinct keys never
//!   share a file.
//! - Writes land in a sibling temp file and are renamed into place, so a
//!   reader sees either the old or the new value.
//! - A failed write leaves no temp file behind.

use super::{KeyValueStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const VALUE_FILE_EXTENSION: &str = "json";
const TEMP_FILE_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates when missing) the data directory.
    pub async fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{VALUE_FILE_EXTENSION}", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.value_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::InvalidText(key.to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.value_path(key);
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(TEMP_FILE_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        if let Err(err) = replace_file(&temp_path, &path, value.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err.into());
        }
        sync_dir(&self.data_dir).await?;
        Ok(())
    }
}

async fn replace_file(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp_path, path).await
}

/// Flushes the rename itself so the new value survives a crash.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Maps a storage key to a file stem inside the data directory.
///
/// ASCII letters, digits and `-` pass through; every other byte becomes
/// `_xx` (lowercase hex), so the mapping is injective and never yields a
/// path separator.
fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    stem
}
