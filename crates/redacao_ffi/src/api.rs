//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the essay screen use cases to Dart via FRB.
//! - Own the process-wide store handle opened from `StoreConfig`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are returned as envelopes with `ok=false` and a message.

use log::warn;
use once_cell::sync::OnceCell;
use redacao_core::{
    check_draft_length, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, DraftLength, EssayRecord, EssayService, EssayStore, KeyValueStorage,
    ServiceError, StoreConfig, SynonymIndex,
};
use std::sync::Arc;
use tokio::sync::OnceCell as AsyncOnceCell;

type SharedService = EssayService<EssayStore<Arc<dyn KeyValueStorage>>>;

static ESSAY_SERVICE: AsyncOnceCell<SharedService> = AsyncOnceCell::const_new();
static STORE_CONFIG: OnceCell<StoreConfig> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Essay as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayItem {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl From<EssayRecord> for EssayItem {
    fn from(value: EssayRecord) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            body: value.body,
        }
    }
}

/// Response envelope for list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayListResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<EssayItem>,
    pub message: String,
    /// Set when stored data is unreadable; the UI may offer `essays_reset`.
    pub needs_reset: bool,
}

/// Response envelope for single-essay calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayActionResponse {
    pub ok: bool,
    pub item: Option<EssayItem>,
    pub message: String,
}

impl EssayActionResponse {
    fn success(message: impl Into<String>, item: Option<EssayItem>) -> Self {
        Self {
            ok: true,
            item,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

/// Plain-text export envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub contents: String,
    pub message: String,
}

/// Lists saved essays, newest first.
pub async fn essays_list() -> EssayListResponse {
    let result = match service().await {
        Ok(service) => service.list_recent_first().await,
        Err(message) => return list_failure(message, false),
    };
    match result {
        Ok(records) => {
            let items: Vec<EssayItem> = records.into_iter().map(EssayItem::from).collect();
            let message = if items.is_empty() {
                "No essays.".to_string()
            } else {
                format!("Found {} essay(s).", items.len())
            };
            EssayListResponse {
                ok: true,
                items,
                message,
                needs_reset: false,
            }
        }
        Err(err) => {
            let needs_reset = matches!(
                err,
                ServiceError::Store(redacao_core::StoreError::StorageRead { .. })
            );
            list_failure(format!("essays_list failed: {err}"), needs_reset)
        }
    }
}

/// Loads one essay for the view/edit screen.
pub async fn essay_get(id: String) -> EssayActionResponse {
    match service().await {
        Ok(service) => match service.get_essay(&id).await {
            Ok(record) => EssayActionResponse::success("Essay loaded.", Some(record.into())),
            Err(err) => EssayActionResponse::failure(format!("essay_get failed: {err}")),
        },
        Err(message) => EssayActionResponse::failure(message),
    }
}

/// Saves a new essay.
pub async fn essay_create(title: String, body: String) -> EssayActionResponse {
    match service().await {
        Ok(service) => match service.create_essay(&title, &body).await {
            Ok(record) => EssayActionResponse::success("Essay saved.", Some(record.into())),
            Err(err) => EssayActionResponse::failure(format!("essay_create failed: {err}")),
        },
        Err(message) => EssayActionResponse::failure(message),
    }
}

/// Replaces title and body of an existing essay.
pub async fn essay_update(id: String, title: String, body: String) -> EssayActionResponse {
    match service().await {
        Ok(service) => match service.update_essay(&id, &title, &body).await {
            Ok(record) => EssayActionResponse::success("Essay saved.", Some(record.into())),
            Err(err) => EssayActionResponse::failure(format!("essay_update failed: {err}")),
        },
        Err(message) => EssayActionResponse::failure(message),
    }
}

/// Removes an essay; unknown ids succeed.
pub async fn essay_delete(id: String) -> EssayActionResponse {
    match service().await {
        Ok(service) => match service.delete_essay(&id).await {
            Ok(()) => EssayActionResponse::success("Essay removed.", None),
            Err(err) => EssayActionResponse::failure(format!("essay_delete failed: {err}")),
        },
        Err(message) => EssayActionResponse::failure(message),
    }
}

/// Builds the `.txt` export for the share sheet.
pub async fn essay_export(id: String) -> EssayExportResponse {
    let result = match service().await {
        Ok(service) => service.export_text(&id).await.map_err(|err| err.to_string()),
        Err(message) => Err(message),
    };
    match result {
        Ok(export) => EssayExportResponse {
            ok: true,
            file_name: export.file_name,
            contents: export.contents,
            message: "Essay exported.".to_string(),
        },
        Err(message) => EssayExportResponse {
            ok: false,
            file_name: String::new(),
            contents: String::new(),
            message: format!("essay_export failed: {message}"),
        },
    }
}

/// Discards all stored essays.
pub async fn essays_reset() -> EssayActionResponse {
    match service().await {
        Ok(service) => match service.reset_collection().await {
            Ok(()) => EssayActionResponse::success("Essays reset.", None),
            Err(err) => EssayActionResponse::failure(format!("essays_reset failed: {err}")),
        },
        Err(message) => EssayActionResponse::failure(message),
    }
}

/// Returns `within|at_limit|over_limit` for a draft body.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_length_status(body: String) -> String {
    match check_draft_length(&body) {
        DraftLength::Within => "within",
        DraftLength::AtLimit => "at_limit",
        DraftLength::OverLimit => "over_limit",
    }
    .to_string()
}

/// One synonym row for the search screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymItem {
    pub word: String,
    pub synonyms: Vec<String>,
}

/// Response envelope for synonym search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymFilterResponse {
    /// `false` when the payload could not be parsed.
    pub ok: bool,
    pub items: Vec<SynonymItem>,
    pub message: String,
}

/// Filters a `/sinonimos` payload by headword.
#[flutter_rust_bridge::frb(sync)]
pub fn synonyms_filter(payload: String, query: String) -> SynonymFilterResponse {
    match SynonymIndex::from_json(&payload) {
        Ok(index) => {
            let items: Vec<SynonymItem> = index
                .filter(&query)
                .into_iter()
                .map(|hit| SynonymItem {
                    word: hit.word,
                    synonyms: hit.synonyms,
                })
                .collect();
            let message = if items.is_empty() {
                "No matches.".to_string()
            } else {
                format!("Found {} word(s).", items.len())
            };
            SynonymFilterResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => {
            warn!("event=synonyms_filter module=ffi status=error error_code=payload_invalid error={err}");
            SynonymFilterResponse {
                ok: false,
                items: Vec::new(),
                message: format!("synonyms_filter failed: invalid payload: {err}"),
            }
        }
    }
}

fn list_failure(message: String, needs_reset: bool) -> EssayListResponse {
    EssayListResponse {
        ok: false,
        items: Vec::new(),
        message,
        needs_reset,
    }
}

fn resolve_store_config() -> Result<&'static StoreConfig, String> {
    STORE_CONFIG.get_or_try_init(|| {
        StoreConfig::from_env().map_err(|err| format!("store config invalid: {err}"))
    })
}

async fn service() -> Result<&'static SharedService, String> {
    let config = resolve_store_config()?;
    ESSAY_SERVICE
        .get_or_try_init(|| async {
            config
                .open_store()
                .await
                .map(EssayService::new)
                .map_err(|err| format!("essay store open failed: {err}"))
        })
        .await
}
