//! Error types for the storefront client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("app {appid} not found on the storefront")]
    AppNotFound { appid: u64 },

    #[error("rate limited by the storefront{}", retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("storefront server error (status {status})")]
    ServerError { status: u16 },

    #[error("unexpected storefront response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Whether a retry might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::ServerError { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
