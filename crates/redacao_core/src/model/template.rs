//! Essay template payload served by the remote `/modelos` endpoint.

use serde::{Deserialize, Serialize};

/// One model essay a user can start from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayTemplate {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    /// Cover image URL.
    #[serde(rename = "imagem", default)]
    pub image: String,
    #[serde(rename = "corpo_redacao")]
    pub body: String,
}

impl EssayTemplate {
    /// Parses the `/modelos` response body (a JSON array).
    pub fn list_from_json(payload: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
