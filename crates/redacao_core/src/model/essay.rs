//! Essay record model and collection codec.
//!
//! # Responsibility
//! - Define `EssayRecord` and its opaque identifier.
//! - Encode/decode the single collection blob.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - A decoded collection never contains two records with the same `id`.
//! - Field names on the wire are `id`, `titulo`, `texto`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, stable identifier of one essay.
///
/// Older app builds wrote short base-36 ids; those stay valid, so the id is
/// kept as text rather than a parsed UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EssayId(String);

impl EssayId {
    /// Generates a fresh 128-bit random id encoded as 32 lowercase hex chars.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps an id received from a caller or from persisted data.
    ///
    /// Returns `None` for blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EssayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One saved essay draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayRecord {
    pub id: EssayId,
    /// Free text, may be empty. Serialized as `titulo`.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Free text. The UI caps it softly at 2000 chars; the model does not.
    #[serde(rename = "texto")]
    pub body: String,
}

impl EssayRecord {
    /// Creates a record with a caller-provided id.
    pub fn with_id(id: EssayId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Why a persisted collection blob was rejected.
#[derive(Debug)]
pub enum CollectionDecodeError {
    /// Blob is not a JSON array of essay records.
    Malformed(serde_json::Error),
    /// Blob parses but two records share one id.
    DuplicateId(EssayId),
}

impl Display for CollectionDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed essay collection: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate essay id in collection: {id}"),
        }
    }
}

impl std::error::Error for CollectionDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

/// Decodes the collection blob, preserving persisted order.
pub fn decode_collection(blob: &str) -> Result<Vec<EssayRecord>, CollectionDecodeError> {
    let records: Vec<EssayRecord> =
        serde_json::from_str(blob).map_err(CollectionDecodeError::Malformed)?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id.as_str()) {
            return Err(CollectionDecodeError::DuplicateId(record.id.clone()));
        }
    }

    Ok(records)
}

/// Encodes the collection blob in persisted order.
pub fn encode_collection(records: &[EssayRecord]) -> String {
    // Serializing plain strings into a JSON array cannot fail.
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}
