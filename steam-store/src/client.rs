//! Storefront HTTP client with retry and a per-process details cache

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::StoreApp;

/// Default storefront API host.
pub const DEFAULT_STORE_URL: &str = "https://store.steampowered.com/api";

/// The storefront is slow to fail; keep the timeout short so a wedged
/// request doesn't stall a whole library sync.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
const DEFAULT_MAX_BACKOFF_MS: u64 = 10_000;
const BACKOFF_MULTIPLIER: f64 = 2.0;
const JITTER_FACTOR: f64 = 0.1;

/// Client for the storefront `appdetails` endpoint.
///
/// Details documents are immutable enough for a sync run, so successful
/// lookups are cached in memory for the lifetime of the client. Unsuccessful
/// lookups are not cached; a delisted app stays an [`Error::AppNotFound`] on
/// every call.
#[derive(Debug)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    cache: Mutex<HashMap<u64, StoreApp>>,
}

impl StoreClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_STORE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Override the storefront host (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Set the maximum number of retries (0 disables retry).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial backoff delay in milliseconds.
    #[must_use]
    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Set the maximum backoff delay in milliseconds.
    #[must_use]
    pub fn with_max_backoff_ms(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    /// Fetch the details document for `appid`, consulting the cache first.
    pub async fn app_details(&self, appid: u64) -> Result<StoreApp> {
        if let Some(app) = self.cache.lock().get(&appid).cloned() {
            return Ok(app);
        }
        let app = self.fetch_with_retry(appid).await?;
        self.cache.lock().insert(appid, app.clone());
        Ok(app)
    }

    /// Whether `appid` has a cached details document.
    pub fn is_cached(&self, appid: u64) -> bool {
        self.cache.lock().contains_key(&appid)
    }

    /// Drop all cached documents.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    async fn fetch_with_retry(&self, appid: u64) -> Result<StoreApp> {
        let mut attempts = 0;
        let mut backoff_ms = self.initial_backoff_ms;

        loop {
            match self.fetch(appid).await {
                Ok(app) => return Ok(app),
                Err(e) if e.is_retryable() && attempts < self.max_retries => {
                    attempts += 1;
                    // A rate-limit hint from the server overrides our own
                    // backoff schedule, but never the ceiling; the header
                    // value is untrusted and may be enormous.
                    let delay_ms = match &e {
                        Error::RateLimited {
                            retry_after: Some(secs),
                        } => secs.saturating_mul(1000).min(self.max_backoff_ms),
                        _ => backoff_ms,
                    };
                    let jitter = rand::thread_rng()
                        .gen_range(0..=(delay_ms as f64 * JITTER_FACTOR) as u64);
                    warn!(
                        "storefront request for {appid} failed ({e}), \
                         retry {attempts}/{} in {}ms",
                        self.max_retries,
                        delay_ms + jitter
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    backoff_ms = ((backoff_ms as f64 * BACKOFF_MULTIPLIER) as u64)
                        .min(self.max_backoff_ms);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self, appid: u64) -> Result<StoreApp> {
        let url = format!("{}/appdetails", self.base_url);
        debug!("fetching storefront details for {appid}");
        let response = self
            .http
            .get(&url)
            .query(&[("appids", appid.to_string())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(Error::RateLimited { retry_after });
        }
        if status.is_server_error() {
            return Err(Error::ServerError {
                status: status.as_u16(),
            });
        }
        // The storefront reports unknown apps inside a 200 body, not via
        // status; other 4xx statuses are unexpected.
        if !status.is_success() {
            return Err(Error::InvalidResponse(format!(
                "unexpected status {status} for app {appid}"
            )));
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        // The body is keyed by the requested appid:
        // {"440": {"success": true, "data": {...}}}
        let entry = body
            .get(appid.to_string())
            .ok_or_else(|| Error::InvalidResponse(format!("no entry for app {appid}")))?;
        if !entry
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(Error::AppNotFound { appid });
        }
        let data = entry
            .get("data")
            .ok_or_else(|| Error::InvalidResponse(format!("no data for app {appid}")))?;
        Ok(serde_json::from_value(data.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = StoreClient::new()
            .expect("client")
            .with_base_url("http://localhost:9000/");
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_cache_starts_empty() {
        let client = StoreClient::new().expect("client");
        assert!(!client.is_cached(440));
    }
}
