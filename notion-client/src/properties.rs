//! Property value builders and extractors
//!
//! Notion property values are deeply-nested tagged JSON. These helpers build
//! the write-side payloads (`{"title": [{"text": {"content": ...}}]}`) and
//! pull plain data back out of page objects, so calling code never spells
//! the nesting by hand.

use serde_json::{Map, Value, json};

/// A title value (the database's primary column).
pub fn title(text: &str) -> Value {
    json!({"title": [{"text": {"content": text}}]})
}

/// A rich-text value, as one unstyled run.
pub fn rich_text(text: &str) -> Value {
    json!({"rich_text": [{"text": {"content": text}}]})
}

/// A number value.
pub fn number(value: f64) -> Value {
    json!({"number": value})
}

/// A date value from an ISO-8601 date string.
pub fn date(start: &str) -> Value {
    json!({"date": {"start": start}})
}

/// A select value.
pub fn select(name: &str) -> Value {
    json!({"select": {"name": name}})
}

/// A multi-select value.
pub fn multi_select<S: AsRef<str>>(names: &[S]) -> Value {
    let options: Vec<Value> = names
        .iter()
        .map(|name| json!({"name": name.as_ref()}))
        .collect();
    json!({"multi_select": options})
}

/// An externally-hosted file, for covers and file properties.
pub fn external_file(url: &str) -> Value {
    json!({"type": "external", "external": {"url": url}})
}

/// An emoji icon.
pub fn emoji_icon(emoji: &str) -> Value {
    json!({"type": "emoji", "emoji": emoji})
}

// Schema definitions, for database creation.

/// Declare a title column.
pub fn title_schema() -> Value {
    json!({"title": {}})
}

/// Declare a rich-text column.
pub fn rich_text_schema() -> Value {
    json!({"rich_text": {}})
}

/// Declare a number column.
pub fn number_schema() -> Value {
    json!({"number": {}})
}

/// Declare a date column.
pub fn date_schema() -> Value {
    json!({"date": {}})
}

/// Declare a select column.
pub fn select_schema() -> Value {
    json!({"select": {}})
}

/// Declare a multi-select column.
pub fn multi_select_schema() -> Value {
    json!({"multi_select": {}})
}

/// Name of the title property in a schema map, if any.
///
/// Every Notion database has exactly one, but its name is user-controlled,
/// so readers locate it by type rather than by name.
pub fn find_title_property(properties: &Map<String, Value>) -> Option<&str> {
    properties
        .iter()
        .find(|(_, spec)| {
            spec.get("type").and_then(Value::as_str) == Some("title")
                || spec.get("title").is_some()
        })
        .map(|(name, _)| name.as_str())
}

/// Concatenated plain text of a title or rich-text property value.
pub fn plain_text(property: &Value) -> Option<String> {
    let runs = property
        .get("title")
        .or_else(|| property.get("rich_text"))?
        .as_array()?;
    let mut text = String::new();
    for run in runs {
        if let Some(chunk) = run.get("plain_text").and_then(Value::as_str) {
            text.push_str(chunk);
        } else if let Some(chunk) = run
            .get("text")
            .and_then(|t| t.get("content"))
            .and_then(Value::as_str)
        {
            text.push_str(chunk);
        }
    }
    Some(text)
}
