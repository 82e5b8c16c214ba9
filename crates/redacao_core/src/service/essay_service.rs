//! Essay use-case service.
//!
//! # Responsibility
//! - Provide the list/create/edit/delete flows the essay screens use.
//! - Classify draft length against the 2000-char soft limit.
//! - Build plain-text exports with filesystem-safe names.
//!
//! # Invariants
//! - Listing for display is most-recent-first; storage order is untouched.
//! - Log lines carry ids and counts only, never essay text.

use crate::model::essay::{EssayId, EssayRecord};
use crate::model::template::EssayTemplate;
use crate::repo::essay_repo::{EssayRepository, StoreError};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Soft body limit enforced by the editing screens (about 30 lines).
pub const DRAFT_SOFT_LIMIT_CHARS: usize = 2000;

/// Title shown and exported for essays without a title.
pub const UNTITLED_LABEL: &str = "Sem título";

const EXPORT_FILE_EXTENSION: &str = "txt";

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]+"#).expect("valid file name regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for essay use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller passed a blank or otherwise unusable id.
    InvalidId(String),
    /// Target essay does not exist.
    EssayNotFound(EssayId),
    /// Store failure other than a missing record.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid essay id: `{value}`"),
            Self::EssayNotFound(id) => write!(f, "essay not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::EssayNotFound(id),
            other => Self::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Draft body length relative to the soft limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftLength {
    /// Below the limit.
    Within,
    /// Exactly at the limit; the UI shows a one-time warning.
    AtLimit,
    /// Past the limit; the edit screen rejects the change.
    OverLimit,
}

/// Plain-text export of one essay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedEssay {
    pub file_name: String,
    pub contents: String,
}

/// Essay service facade over a repository implementation.
pub struct EssayService<R: EssayRepository> {
    repo: R,
}

impl<R: EssayRepository> EssayService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists essays newest first, the order the home screen renders.
    pub async fn list_recent_first(&self) -> ServiceResult<Vec<EssayRecord>> {
        let mut records = self.repo.list_all().await?;
        records.reverse();
        Ok(records)
    }

    pub async fn get_essay(&self, id: &str) -> ServiceResult<EssayRecord> {
        let id = parse_id(id)?;
        let found = self.repo.get(&id).await?;
        found.ok_or(ServiceError::EssayNotFound(id))
    }

    pub async fn create_essay(&self, title: &str, body: &str) -> ServiceResult<EssayRecord> {
        let created = self.repo.create(title, body).await?;
        info!(
            "event=essay_create module=service status=ok essay_id={} body_chars={}",
            created.id,
            created.body.chars().count()
        );
        Ok(created)
    }

    /// Saves a remote model essay as a new local essay.
    pub async fn create_from_template(
        &self,
        template: &EssayTemplate,
    ) -> ServiceResult<EssayRecord> {
        let created = self.repo.create(&template.title, &template.body).await?;
        info!(
            "event=essay_create module=service status=ok source=template template_id={} essay_id={}",
            template.id, created.id
        );
        Ok(created)
    }

    pub async fn update_essay(
        &self,
        id: &str,
        title: &str,
        body: &str,
    ) -> ServiceResult<EssayRecord> {
        let id = parse_id(id)?;
        let updated = self.repo.update(&id, title, body).await?;
        info!(
            "event=essay_update module=service status=ok essay_id={} body_chars={}",
            updated.id,
            updated.body.chars().count()
        );
        Ok(updated)
    }

    pub async fn delete_essay(&self, id: &str) -> ServiceResult<()> {
        let id = parse_id(id)?;
        self.repo.delete(&id).await?;
        info!("event=essay_delete module=service status=ok essay_id={id}");
        Ok(())
    }

    /// Builds the `.txt` export of one essay.
    pub async fn export_text(&self, id: &str) -> ServiceResult<ExportedEssay> {
        let record = self.get_essay(id).await?;
        Ok(ExportedEssay {
            file_name: export_file_name(&record.title),
            contents: record.body,
        })
    }

    /// Discards the stored collection; the recovery path after a read error.
    pub async fn reset_collection(&self) -> ServiceResult<()> {
        self.repo.reset().await?;
        info!("event=essay_reset module=service status=ok");
        Ok(())
    }
}

/// Classifies a draft body against `DRAFT_SOFT_LIMIT_CHARS`.
pub fn check_draft_length(body: &str) -> DraftLength {
    match body.chars().count() {
        n if n < DRAFT_SOFT_LIMIT_CHARS => DraftLength::Within,
        DRAFT_SOFT_LIMIT_CHARS => DraftLength::AtLimit,
        _ => DraftLength::OverLimit,
    }
}

/// Returns the display title, falling back to `UNTITLED_LABEL`.
pub fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        UNTITLED_LABEL
    } else {
        title
    }
}

/// Derives `<title>.txt` with path-unsafe characters replaced.
pub fn export_file_name(title: &str) -> String {
    let safe = UNSAFE_FILE_CHARS_RE.replace_all(display_title(title), "_");
    let collapsed = WHITESPACE_RE.replace_all(&safe, " ");
    let stem = collapsed.trim().trim_matches('.');
    let stem = if stem.is_empty() { UNTITLED_LABEL } else { stem };
    format!("{stem}.{EXPORT_FILE_EXTENSION}")
}

fn parse_id(value: &str) -> ServiceResult<EssayId> {
    EssayId::parse(value).ok_or_else(|| ServiceError::InvalidId(value.to_string()))
}
