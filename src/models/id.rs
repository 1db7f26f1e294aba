use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use crate::{
    db::Document,
    error::{AppError, AppResult},
};

/// Field under which the store keeps its native identifier
pub const STORE_ID_FIELD: &str = "_id";

/// Field under which identifiers are exposed to API clients
pub const PUBLIC_ID_FIELD: &str = "id";

/// Store-native document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Generates a fresh identifier for a newly inserted document
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates the boundary string form and converts it to a store id
    pub fn parse(raw: &str) -> AppResult<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AppError::InvalidId(raw.to_string()))
    }

    /// Returns true if `raw` would parse as a store id
    pub fn is_valid(raw: &str) -> bool {
        Uuid::parse_str(raw).is_ok()
    }

    /// Reads the store id out of a stored document
    pub fn from_document(doc: &Document) -> Option<Self> {
        doc.get(STORE_ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| Self::parse(s).ok())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rewrites a stored document into its outward form, replacing the
/// store's `_id` with a string `id`. Documents without `_id` pass through.
pub fn decode(mut doc: Document) -> Document {
    if let Some(raw) = doc.remove(STORE_ID_FIELD) {
        let id = match raw {
            Value::String(s) => s,
            other => other.to_string(),
        };
        doc.insert(PUBLIC_ID_FIELD.to_string(), Value::String(id));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_valid_id() {
        let id = DocumentId::new();
        let parsed = DocumentId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_malformed_id() {
        let err = DocumentId::parse("not-an-id").unwrap_err();
        assert!(matches!(err, AppError::InvalidId(raw) if raw == "not-an-id"));
        assert!(!DocumentId::is_valid("507f1f77bcf86cd79943901"));
    }

    #[test]
    fn test_decode_renames_store_id() {
        let id = DocumentId::new();
        let decoded = decode(doc(json!({ "_id": id.to_string(), "title": "Heat" })));
        assert_eq!(decoded.get("id"), Some(&json!(id.to_string())));
        assert!(!decoded.contains_key("_id"));
        assert_eq!(decoded.get("title"), Some(&json!("Heat")));
    }

    #[test]
    fn test_decode_passes_through_without_id() {
        let original = doc(json!({ "title": "Heat" }));
        assert_eq!(decode(original.clone()), original);
    }
}
