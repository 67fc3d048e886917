//! Error types for the Notion client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited by Notion{}", retry_after.map(|s| format!(" (retry after {s:.1}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<f64> },

    #[error("Notion API error (status {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("database {database_id} has no data sources")]
    MissingDataSource { database_id: String },

    #[error("database has no title property")]
    MissingTitleProperty,
}

impl Error {
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
