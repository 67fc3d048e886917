//! Error types for the Steam Web API client

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    // Status classification (see `classify_status`)
    #[error("endpoint not found: {message}")]
    NotFound { message: String },

    #[error("not authorized for this API: {message}")]
    Unauthorized { message: String },

    #[error("this API requires a key: {message}")]
    KeyRequired { message: String },

    #[error("key lacks permission for this API: {message}")]
    InsufficientKey { message: String },

    #[error("request did not match the API's parameters: {message}")]
    BadCall { message: String },

    #[error("request rejected with status {status}: {message}")]
    RequestRejected { status: u16, message: String },

    #[error("API server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("rate limited by the API{}", retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    // Response shape errors
    #[error("response JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing response field: {field}")]
    MissingField { field: String },

    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("field {field} is not a {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    // Domain errors
    #[error("profile is private or results are hidden")]
    PrivateProfile,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a wrong type error
    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error came from the status classifier, as opposed to a
    /// transport or response-shape failure.
    pub fn is_status_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Unauthorized { .. }
                | Self::KeyRequired { .. }
                | Self::InsufficientKey { .. }
                | Self::BadCall { .. }
                | Self::RequestRejected { .. }
                | Self::ServerError { .. }
                | Self::RateLimited { .. }
        )
    }
}

/// Classify an HTTP response status into the API error taxonomy.
///
/// Returns `None` for 2xx/3xx statuses. A 403 is ambiguous on its own: with
/// a key on the request it means the key lacks privilege, without one it
/// means a key was required. `message` is the remote error message when the
/// body yielded one; callers fall back to the bare status otherwise.
pub fn classify_status(
    status: StatusCode,
    key_sent: bool,
    retry_after: Option<u64>,
    message: Option<&str>,
) -> Option<Error> {
    let code = status.as_u16();
    let message = |fallback: &str| message.unwrap_or(fallback).to_string();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(Error::RateLimited { retry_after });
    }

    match code {
        400..=499 => Some(match code {
            404 => Error::NotFound {
                message: message("the function or service does not exist"),
            },
            401 => Error::Unauthorized {
                message: message("this API is not accessible to you"),
            },
            403 if key_sent => Error::InsufficientKey {
                message: message("no permission to use this API, or the key is invalid"),
            },
            403 => Error::KeyRequired {
                message: message("this API requires a key to call"),
            },
            400 => Error::BadCall {
                message: message("the parameters sent did not match this API's requirements"),
            },
            _ => Error::RequestRejected {
                status: code,
                message: message("configuration, parameter or environment problem"),
            },
        }),
        500..=599 => Some(Error::ServerError {
            status: code,
            message: message("the API server encountered an unknown error"),
        }),
        _ => None,
    }
}

pub type Result<T> = std::result::Result<T, Error>;
