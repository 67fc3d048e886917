//! Read-only views over Web API response bodies
//!
//! `ApiResponse` wraps a decoded JSON tree. Fields of nested objects are
//! reached by name, array elements by index, and every access returns
//! another `ApiResponse`, so consuming code can walk
//! `response.field("players")?.index(0)?.field("personaname")?` without
//! dealing with `serde_json::Value` directly.
//!
//! Two lookup channels exist on purpose: [`ApiResponse::field`] fails with
//! [`Error::MissingField`] while [`ApiResponse::get`] returns `Option` for
//! membership tests. Callers that distinguish "this key is optional" from
//! "this key must exist" rely on that split.

use serde_json::Value;

use crate::error::{Error, Result};

/// Immutable view over one node of a JSON response tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    value: Value,
}

impl ApiResponse {
    /// Wrap a decoded JSON value.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The underlying JSON value.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Look up an object field, failing if it is absent.
    pub fn field(&self, name: &str) -> Result<Self> {
        self.get(name).ok_or_else(|| Error::missing_field(name))
    }

    /// Look up an object field, `None` if absent or if this node is not an
    /// object.
    pub fn get(&self, name: &str) -> Option<Self> {
        self.value.get(name).cloned().map(Self::new)
    }

    /// Whether this node is an object containing `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.value.get(name).is_some()
    }

    /// Look up an array element by position.
    pub fn index(&self, index: usize) -> Result<Self> {
        let Some(items) = self.value.as_array() else {
            return Err(Error::wrong_type("<root>", "array"));
        };
        items
            .get(index)
            .cloned()
            .map(Self::new)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: items.len(),
            })
    }

    /// Keys of an object node. Empty for non-objects.
    pub fn keys(&self) -> Vec<String> {
        match self.value.as_object() {
            Some(map) => map.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Elements of an array node. Empty for non-arrays.
    pub fn elements(&self) -> Vec<Self> {
        match self.value.as_array() {
            Some(items) => items.iter().cloned().map(Self::new).collect(),
            None => Vec::new(),
        }
    }

    /// Number of fields (object) or elements (array); 0 for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Scalar projections. The `as_*` family mirrors serde_json and returns
    // `Option`; the named family returns `Result` with the expected type.

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.value.as_u64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// This node as a string.
    pub fn string(&self) -> Result<String> {
        self.as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::wrong_type("<value>", "string"))
    }

    /// This node as a signed integer.
    pub fn integer(&self) -> Result<i64> {
        self.as_i64()
            .ok_or_else(|| Error::wrong_type("<value>", "integer"))
    }

    /// This node as an unsigned integer.
    pub fn unsigned(&self) -> Result<u64> {
        self.as_u64()
            .ok_or_else(|| Error::wrong_type("<value>", "unsigned integer"))
    }

    /// This node as a float. Integers widen.
    pub fn float(&self) -> Result<f64> {
        self.as_f64()
            .ok_or_else(|| Error::wrong_type("<value>", "number"))
    }

    /// This node as a boolean. The Web API frequently encodes booleans as
    /// 0/1, so numeric nodes coerce.
    pub fn boolean(&self) -> Result<bool> {
        if let Some(b) = self.as_bool() {
            return Ok(b);
        }
        match self.as_i64() {
            Some(n) => Ok(n != 0),
            None => Err(Error::wrong_type("<value>", "boolean")),
        }
    }

    /// `field(name)` then `string()`.
    pub fn string_of(&self, name: &str) -> Result<String> {
        self.field(name)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::wrong_type(name, "string"))
    }

    /// `field(name)` then `unsigned()`.
    pub fn unsigned_of(&self, name: &str) -> Result<u64> {
        self.field(name)?
            .as_u64()
            .ok_or_else(|| Error::wrong_type(name, "unsigned integer"))
    }

    /// `field(name)` then `integer()`.
    pub fn integer_of(&self, name: &str) -> Result<i64> {
        self.field(name)?
            .as_i64()
            .ok_or_else(|| Error::wrong_type(name, "integer"))
    }
}

impl From<Value> for ApiResponse {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ApiResponse {
        ApiResponse::new(json!({
            "response": {
                "players": [
                    {"steamid": "76561199077366346", "personaname": "kali", "level": 12},
                    {"steamid": "76561197960287930", "personaname": "gabe"}
                ],
                "private": false
            }
        }))
    }

    #[test]
    fn test_nested_round_trip() {
        let doc = sample();
        let players = doc.field("response").unwrap().field("players").unwrap();
        assert_eq!(players.len(), 2);

        let first = players.index(0).unwrap();
        assert_eq!(first.string_of("personaname").unwrap(), "kali");
        assert_eq!(first.unsigned_of("level").unwrap(), 12);
        assert_eq!(
            first.field("steamid").unwrap().as_str(),
            Some("76561199077366346")
        );
    }

    #[test]
    fn test_missing_field_vs_membership() {
        let doc = sample().field("response").unwrap();
        assert!(doc.contains("players"));
        assert!(!doc.contains("games"));
        assert!(doc.get("games").is_none());
        assert!(matches!(
            doc.field("games"),
            Err(Error::MissingField { field }) if field == "games"
        ));
    }

    #[test]
    fn test_index_out_of_range_is_distinct() {
        let players = sample()
            .field("response")
            .unwrap()
            .field("players")
            .unwrap();
        assert!(matches!(
            players.index(5),
            Err(Error::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_iteration_yields_keys() {
        let doc = sample().field("response").unwrap();
        let mut keys = doc.keys();
        keys.sort();
        assert_eq!(keys, vec!["players", "private"]);
    }

    #[test]
    fn test_boolean_coercion() {
        let doc = ApiResponse::new(json!({"a": 1, "b": 0, "c": true}));
        assert!(doc.field("a").unwrap().boolean().unwrap());
        assert!(!doc.field("b").unwrap().boolean().unwrap());
        assert!(doc.field("c").unwrap().boolean().unwrap());
        assert!(doc.field("a").unwrap().as_bool().is_none());
    }

    #[test]
    fn test_scalars_pass_through() {
        let doc = ApiResponse::new(json!({"n": 3.5, "s": "x"}));
        assert_eq!(doc.field("n").unwrap().float().unwrap(), 3.5);
        assert!(doc.field("s").unwrap().integer().is_err());
        assert_eq!(doc.field("s").unwrap().len(), 0);
    }
}
