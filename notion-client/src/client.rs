//! Notion REST client
//!
//! Speaks the 2025-09-03 API revision, where a database is a container of
//! data sources and pages hang off a data source rather than the database
//! itself. Every request carries the integration token and the pinned
//! `Notion-Version` header; 429 responses are retried after the interval
//! the server names in `Retry-After`.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::properties::{find_title_property, plain_text};

/// Default API host.
pub const DEFAULT_NOTION_URL: &str = "https://api.notion.com/v1";

/// Pinned API revision.
pub const NOTION_VERSION: &str = "2025-09-03";

/// Maximum page size the query endpoint accepts.
const QUERY_PAGE_SIZE: u64 = 100;

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Backoff for transient failures that carry no Retry-After hint.
const TRANSIENT_BACKOFF: Duration = Duration::from_secs(2);

/// Longest wait we accept from a Retry-After header. The header comes from
/// the wire, so it may be absurd or non-finite; anything outside this
/// bound falls back to [`TRANSIENT_BACKOFF`].
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// A database container: its ID, primary data source and column schema.
#[derive(Debug, Clone)]
pub struct Database {
    pub id: String,
    /// ID of the first data source. Queries and page creation target this.
    pub data_source_id: Option<String>,
    pub properties: Map<String, Value>,
}

impl Database {
    /// Name of the title column.
    pub fn title_property(&self) -> Result<&str> {
        find_title_property(&self.properties).ok_or(Error::MissingTitleProperty)
    }

    /// Whether the schema has a column named `name`.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// One page row with its property values.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub properties: Map<String, Value>,
}

impl Page {
    /// Plain text of the title property, if the page has one.
    pub fn title_text(&self) -> Option<String> {
        self.properties
            .values()
            .find(|prop| prop.get("title").is_some())
            .and_then(plain_text)
    }
}

/// Client bound to one integration token.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    base_url: String,
    token: String,
    max_retries: u32,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_NOTION_URL.to_string(),
            token: token.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Override the API host (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Set the maximum number of retries per request.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Create a database under a parent page, with `properties` as the
    /// schema of its initial data source.
    pub async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        icon: Option<Value>,
        properties: Map<String, Value>,
    ) -> Result<Database> {
        let mut body = json!({
            "parent": {"type": "page_id", "page_id": parent_page_id},
            "title": [{"type": "text", "text": {"content": title}}],
            "initial_data_source": {"properties": properties}
        });
        if let Some(icon) = icon {
            body["icon"] = icon;
        }
        let response = self.request(Method::POST, "databases", Some(&body)).await?;
        Ok(Database {
            id: string_field(&response, "id")?,
            data_source_id: first_data_source(&response),
            // The creation response omits the schema; we sent it.
            properties,
        })
    }

    /// Retrieve a database and the schema of its primary data source.
    pub async fn database(&self, database_id: &str) -> Result<Database> {
        let path = format!("databases/{database_id}");
        let response = self.request(Method::GET, &path, None).await?;
        let data_source_id =
            first_data_source(&response).ok_or_else(|| Error::MissingDataSource {
                database_id: database_id.to_string(),
            })?;

        // The database object itself no longer carries the schema; the data
        // source does.
        let properties = match properties_of(&response) {
            Some(map) if !map.is_empty() => map,
            _ => {
                let ds = self
                    .request(Method::GET, &format!("data_sources/{data_source_id}"), None)
                    .await?;
                properties_of(&ds).unwrap_or_default()
            }
        };

        Ok(Database {
            id: string_field(&response, "id")?,
            data_source_id: Some(data_source_id),
            properties,
        })
    }

    /// Every page of a data source, following cursor pagination to the end.
    pub async fn query_all_pages(&self, data_source_id: &str) -> Result<Vec<Page>> {
        let path = format!("data_sources/{data_source_id}/query");
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({"page_size": QUERY_PAGE_SIZE});
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }
            let response = self.request(Method::POST, &path, Some(&body)).await?;

            for result in response
                .get("results")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                pages.push(parse_page(result)?);
            }

            let has_more = response
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !has_more {
                break;
            }
            cursor = response
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_owned);
            if cursor.is_none() {
                break;
            }
        }
        debug!("query returned {} pages", pages.len());
        Ok(pages)
    }

    /// Create a page in a data source.
    pub async fn create_page(
        &self,
        data_source_id: &str,
        properties: Map<String, Value>,
        icon: Option<Value>,
        cover: Option<Value>,
    ) -> Result<Page> {
        let mut body = json!({
            "parent": {"type": "data_source_id", "data_source_id": data_source_id},
            "properties": properties
        });
        if let Some(icon) = icon {
            body["icon"] = icon;
        }
        if let Some(cover) = cover {
            body["cover"] = cover;
        }
        let response = self.request(Method::POST, "pages", Some(&body)).await?;
        parse_page(&response)
    }

    /// Update property values (and optionally icon or cover) on an
    /// existing page.
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Map<String, Value>,
        icon: Option<Value>,
        cover: Option<Value>,
    ) -> Result<Page> {
        let path = format!("pages/{page_id}");
        let mut body = json!({"properties": properties});
        if let Some(icon) = icon {
            body["icon"] = icon;
        }
        if let Some(cover) = cover {
            body["cover"] = cover;
        }
        let response = self.request(Method::PATCH, &path, Some(&body)).await?;
        parse_page(&response)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut attempts = 0;
        loop {
            match self.request_once(method.clone(), path, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < self.max_retries => {
                    attempts += 1;
                    let delay = match &e {
                        Error::RateLimited {
                            retry_after: Some(secs),
                        } => retry_after_delay(*secs),
                        _ => TRANSIENT_BACKOFF,
                    };
                    warn!(
                        "Notion request {path} failed ({e}), retry {attempts}/{} in {delay:?}",
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok());
            return Err(Error::RateLimited { retry_after });
        }

        let text = response.text().await?;
        if !status.is_success() {
            let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            return Err(Error::Api {
                status: status.as_u16(),
                code: parsed
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                message: parsed
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(&text)
                    .to_string(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Turn a server-supplied Retry-After value into a bounded sleep.
/// `Duration::from_secs_f64` panics on non-finite or oversized input, so
/// the raw header value never reaches it; nonsense hints get the normal
/// transient backoff instead.
fn retry_after_delay(secs: f64) -> Duration {
    if !secs.is_finite() || secs < 0.0 || secs > MAX_RETRY_AFTER.as_secs_f64() {
        return TRANSIENT_BACKOFF;
    }
    Duration::from_secs_f64(secs)
}

fn string_field(value: &Value, field: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Api {
            status: 200,
            code: "malformed_response".to_string(),
            message: format!("object missing string field {field:?}"),
        })
}

fn first_data_source(database: &Value) -> Option<String> {
    database
        .get("data_sources")
        .and_then(Value::as_array)
        .and_then(|sources| sources.first())
        .and_then(|ds| ds.get("id"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn properties_of(value: &Value) -> Option<Map<String, Value>> {
    value
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
}

fn parse_page(value: &Value) -> Result<Page> {
    Ok(Page {
        id: string_field(value, "id")?,
        properties: properties_of(value).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_delay_bounds() {
        assert_eq!(retry_after_delay(1.5), Duration::from_millis(1500));
        assert_eq!(retry_after_delay(0.0), Duration::ZERO);
        // Garbage hints fall back to the flat backoff instead of panicking
        // or sleeping forever.
        assert_eq!(retry_after_delay(1e300), TRANSIENT_BACKOFF);
        assert_eq!(retry_after_delay(f64::INFINITY), TRANSIENT_BACKOFF);
        assert_eq!(retry_after_delay(f64::NAN), TRANSIENT_BACKOFF);
        assert_eq!(retry_after_delay(-5.0), TRANSIENT_BACKOFF);
    }

    #[test]
    fn test_first_data_source() {
        let db = json!({
            "id": "db1",
            "data_sources": [{"id": "ds1", "name": "Games"}, {"id": "ds2"}]
        });
        assert_eq!(first_data_source(&db), Some("ds1".to_string()));
        assert_eq!(first_data_source(&json!({"id": "db1"})), None);
        assert_eq!(
            first_data_source(&json!({"id": "db1", "data_sources": []})),
            None
        );
    }

    #[test]
    fn test_page_title_text() {
        let page = parse_page(&json!({
            "id": "p1",
            "properties": {
                "Playtime (hours)": {"number": 4.5},
                "Name": {"title": [{"plain_text": "Portal"}]}
            }
        }))
        .expect("page");
        assert_eq!(page.title_text(), Some("Portal".to_string()));
    }

    #[test]
    fn test_database_title_property() {
        let db = Database {
            id: "db1".to_string(),
            data_source_id: Some("ds1".to_string()),
            properties: serde_json::from_value(json!({
                "Name": {"type": "title", "title": {}},
                "Notes": {"type": "rich_text", "rich_text": {}}
            }))
            .expect("schema"),
        };
        assert_eq!(db.title_property().expect("title"), "Name");
        assert!(db.has_property("Notes"));
        assert!(!db.has_property("Status"));
    }
}
