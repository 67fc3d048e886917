//! HTTP client and endpoint builder for the Steam Web API
//!
//! Remote procedures live at `base/interface/method/version/` URLs. An
//! [`Endpoint`] is an immutable chain of path segments built off an
//! [`ApiClient`]; invoking it with an [`ApiParams`] set performs exactly one
//! HTTP request, classifies the status (see [`crate::classify_status`]) and
//! wraps the JSON body in an [`ApiResponse`], stripping the single-key
//! `response` envelope the API puts around most bodies.
//!
//! The client performs no retries of its own. Callers that want resilience
//! compose a retry policy around it.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result, classify_status};
use crate::response::ApiResponse;

/// Reserved parameter carrying the API key.
const KEY_PARAM: &str = "key";

/// Reserved parameter selecting the serialization format. Setting it
/// disables automatic parsing.
const FORMAT_PARAM: &str = "format";

/// Single-key envelope the API wraps most JSON bodies in.
const ENVELOPE_KEY: &str = "response";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verb for an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A parameter value in Web API encoding.
///
/// Lists are joined with commas and booleans become `1`/`0`, matching the
/// conventions of the remote API.
#[derive(Debug, Clone)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Unsigned(u64),
    Bool(bool),
    List(Vec<String>),
}

impl ParamValue {
    fn encode(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::Unsigned(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Unsigned(u64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(v: &[&str]) -> Self {
        Self::List(v.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Ordered parameter set for one API call.
#[derive(Debug, Clone, Default)]
pub struct ApiParams {
    pairs: Vec<(String, String)>,
}

impl ApiParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, encoding the value.
    #[must_use]
    pub fn push(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.pairs.push((name.into(), value.into().encode()));
        self
    }

    /// Whether a parameter with `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// The encoded `(name, value)` pairs in insertion order.
    pub fn encoded(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Steam Web API client holding the base address and optional key.
///
/// Cheap to clone; clones share the underlying connection pool. Always an
/// explicit instance — there is no process-wide connection singleton, so
/// tests can run several clients with distinct keys side by side.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    key: Option<String>,
}

impl ApiClient {
    /// Create a client against `base_url` (normally
    /// [`crate::DEFAULT_API_URL`]).
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(http, base_url)?)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        // A missing trailing slash would make Url::join drop the last path
        // segment when endpoints resolve against the base.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http,
            base_url: Url::parse(&normalized)?,
            key: None,
        })
    }

    /// Attach an API key. Empty strings mean "no key".
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = if key.is_empty() { None } else { Some(key) };
        self
    }

    /// The configured key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The base address calls resolve against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Start an endpoint path at `interface`.
    pub fn interface(&self, name: &str) -> Result<Endpoint> {
        Endpoint::root(self.clone()).segment(name)
    }

    /// Call `interface/method/version` with `params` in one step.
    pub async fn call(
        &self,
        interface: &str,
        method: &str,
        version: &str,
        params: ApiParams,
    ) -> Result<ApiResponse> {
        self.interface(interface)?
            .method(method)?
            .version(version)?
            .get(&params)
            .await
    }

    /// Fetch the manifest of supported interfaces and methods.
    ///
    /// `GetSupportedAPIList` succeeds with any valid key (or none), which
    /// also makes it the canonical key-validation probe.
    pub async fn supported_api_list(&self) -> Result<ApiResponse> {
        self.call(
            "ISteamWebAPIUtil",
            "GetSupportedAPIList",
            "v1",
            ApiParams::new(),
        )
        .await
    }

    /// Verify the configured key with a test call.
    pub async fn validate_key(&self) -> Result<()> {
        if self.key.is_none() {
            return Err(Error::Configuration(
                "no API key configured to validate".to_string(),
            ));
        }
        match self.supported_api_list().await {
            Ok(_) => Ok(()),
            Err(
                Error::Unauthorized { .. }
                | Error::KeyRequired { .. }
                | Error::InsufficientKey { .. },
            ) => Err(Error::Configuration("this API key is invalid".to_string())),
            Err(e) => Err(e),
        }
    }
}

/// One remote procedure path: an ordered list of segments under a client.
///
/// Endpoints are immutable once built; the URL is fully determined by the
/// base address and the segment chain, so re-deriving the same chain always
/// produces the same URL.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: ApiClient,
    segments: Vec<String>,
    method_override: Option<HttpMethod>,
}

impl Endpoint {
    fn root(client: ApiClient) -> Self {
        Self {
            client,
            segments: Vec::new(),
            method_override: None,
        }
    }

    /// Extend the path with one segment.
    ///
    /// Segments must be identifier-like: a leading ASCII letter followed by
    /// letters, digits or underscores. That keeps typos from silently
    /// producing URLs with separators or query fragments baked in.
    pub fn segment(mut self, name: &str) -> Result<Self> {
        if !is_identifier(name) {
            return Err(Error::invalid_argument(format!(
                "invalid path segment: {name:?}"
            )));
        }
        self.segments.push(name.to_string());
        Ok(self)
    }

    /// Extend with a method segment (e.g. `GetPlayerSummaries`).
    pub fn method(self, name: &str) -> Result<Self> {
        self.segment(name)
    }

    /// Extend with a version segment (e.g. `v0002`).
    pub fn version(self, name: &str) -> Result<Self> {
        self.segment(name)
    }

    /// Bind an HTTP verb to this endpoint, overriding the verb implied by
    /// the invocation. Some APIs are POST-only regardless of caller intent.
    #[must_use]
    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.method_override = Some(method);
        self
    }

    /// The fully-qualified URL: base followed by every segment plus `/`.
    pub fn url(&self) -> String {
        let mut url = self.client.base_url.as_str().to_string();
        for segment in &self.segments {
            url.push_str(segment);
            url.push('/');
        }
        url
    }

    /// Invoke with GET semantics (unless a verb override is bound).
    pub async fn get(&self, params: &ApiParams) -> Result<ApiResponse> {
        self.invoke(HttpMethod::Get, params).await
    }

    /// Invoke with POST semantics (unless a verb override is bound).
    pub async fn post(&self, params: &ApiParams) -> Result<ApiResponse> {
        self.invoke(HttpMethod::Post, params).await
    }

    async fn invoke(&self, default_verb: HttpMethod, params: &ApiParams) -> Result<ApiResponse> {
        if params.contains(FORMAT_PARAM) {
            return Err(Error::invalid_argument(
                "a format override disables parsing; use fetch_raw instead",
            ));
        }
        let body = self.execute(default_verb, params, Some("json")).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(ApiResponse::new(unwrap_envelope(value)))
    }

    /// Invoke with a caller-controlled `format` parameter and return the
    /// body verbatim, with no parsing or envelope handling.
    pub async fn fetch_raw(&self, default_verb: HttpMethod, params: &ApiParams) -> Result<String> {
        if !params.contains(FORMAT_PARAM) {
            return Err(Error::invalid_argument(
                "fetch_raw requires an explicit format parameter",
            ));
        }
        self.execute(default_verb, params, None).await
    }

    async fn execute(
        &self,
        default_verb: HttpMethod,
        params: &ApiParams,
        format: Option<&str>,
    ) -> Result<String> {
        let verb = self.method_override.unwrap_or(default_verb);
        let url = self.url();

        let mut pairs: Vec<(String, String)> = params.encoded().to_vec();
        if let Some(format) = format {
            pairs.push((FORMAT_PARAM.to_string(), format.to_string()));
        }
        let key_sent = if let Some(key) = self.client.key() {
            pairs.push((KEY_PARAM.to_string(), key.to_string()));
            true
        } else {
            params.contains(KEY_PARAM)
        };

        debug!("{verb:?} {url}");
        let request = match verb {
            HttpMethod::Get => self.client.http.get(&url).query(&pairs),
            HttpMethod::Post => self.client.http.post(&url).form(&pairs),
        };
        let response = request.send().await?;

        let status = response.status();
        trace!("response status {status} from {url}");
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await?;

        if let Some(err) = classify_status(
            status,
            key_sent,
            retry_after,
            remote_message(&body).as_deref(),
        ) {
            return Err(err);
        }
        Ok(body)
    }
}

/// Strip the single-key `response` envelope if present.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(ENVELOPE_KEY) => map
            .remove(ENVELOPE_KEY)
            .unwrap_or(Value::Object(serde_json::Map::new())),
        other => other,
    }
}

/// Best-effort extraction of a remote error message from a failure body.
/// Malformed bodies degrade to `None`; the classifier then falls back to a
/// message derived from the status alone.
fn remote_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for path in [&["message"][..], &["error", "message"], &["errormsg"]] {
        let mut node = &value;
        let mut found = true;
        for key in path {
            match node.get(key) {
                Some(next) => node = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            if let Some(s) = node.as_str() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
