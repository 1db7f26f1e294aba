use serde_json::Value;

use super::Document;
use crate::models::DocumentId;

/// A single predicate over a document
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Store id equals
    Id(DocumentId),
    /// Store id is one of; an empty list matches nothing
    IdIn(Vec<DocumentId>),
    /// Field is present and equal to a scalar value
    Eq(String, Value),
    /// Text field contains the needle, ignoring case. Not a pattern match.
    ContainsIgnoreCase(String, String),
    /// Array field contains the value, or scalar field equals it
    HasElement(String, Value),
    /// Array field shares at least one string with the values
    AnyElementOf(String, Vec<String>),
}

/// Conjunction of clauses. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self::all().with(Clause::Id(id))
    }

    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.with(Clause::Eq(field.to_string(), value.into()))
    }

    pub fn id_in(self, ids: Vec<DocumentId>) -> Self {
        self.with(Clause::IdIn(ids))
    }

    pub fn contains_ignore_case(self, field: &str, needle: &str) -> Self {
        self.with(Clause::ContainsIgnoreCase(field.to_string(), needle.to_string()))
    }

    pub fn has_element(self, field: &str, value: impl Into<Value>) -> Self {
        self.with(Clause::HasElement(field.to_string(), value.into()))
    }

    pub fn any_element_of(self, field: &str, values: Vec<String>) -> Self {
        self.with(Clause::AnyElementOf(field.to_string(), values))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluates the filter against an in-memory document
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.matches(doc))
    }
}

impl Clause {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Clause::Id(id) => DocumentId::from_document(doc) == Some(*id),
            Clause::IdIn(ids) => {
                DocumentId::from_document(doc).is_some_and(|found| ids.contains(&found))
            }
            Clause::Eq(field, value) => doc.get(field) == Some(value),
            Clause::ContainsIgnoreCase(field, needle) => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Clause::HasElement(field, value) => match doc.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                Some(other) => other == value,
                None => false,
            },
            Clause::AnyElementOf(field, values) => {
                let hit = |v: &Value| v.as_str().is_some_and(|s| values.iter().any(|x| x == s));
                match doc.get(field) {
                    Some(Value::Array(items)) => items.iter().any(hit),
                    Some(other) => hit(other),
                    None => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&doc(json!({}))));
    }

    #[test]
    fn test_eq_requires_presence() {
        let filter = Filter::all().eq("is_published", true);
        assert!(filter.matches(&doc(json!({ "is_published": true }))));
        assert!(!filter.matches(&doc(json!({ "is_published": false }))));
        assert!(!filter.matches(&doc(json!({ "title": "x" }))));
    }

    #[test]
    fn test_contains_ignore_case_is_literal() {
        let filter = Filter::all().contains_ignore_case("title", "DARK");
        assert!(filter.matches(&doc(json!({ "title": "The Dark Knight" }))));
        assert!(!filter.matches(&doc(json!({ "title": "Daylight" }))));

        let dotted = Filter::all().contains_ignore_case("title", "a.b");
        assert!(!dotted.matches(&doc(json!({ "title": "axb" }))));
        assert!(dotted.matches(&doc(json!({ "title": "A.B." }))));
    }

    #[test]
    fn test_has_element_on_arrays_and_scalars() {
        let filter = Filter::all().has_element("genres", "comedy");
        assert!(filter.matches(&doc(json!({ "genres": ["drama", "comedy"] }))));
        assert!(filter.matches(&doc(json!({ "genres": "comedy" }))));
        assert!(!filter.matches(&doc(json!({ "genres": ["Comedy"] }))));
        assert!(!filter.matches(&doc(json!({}))));
    }

    #[test]
    fn test_any_element_of() {
        let filter =
            Filter::all().any_element_of("genres", vec!["drama".to_string(), "war".to_string()]);
        assert!(filter.matches(&doc(json!({ "genres": ["war"] }))));
        assert!(!filter.matches(&doc(json!({ "genres": ["comedy"] }))));
        assert!(!filter.matches(&doc(json!({ "genres": [] }))));
    }

    #[test]
    fn test_id_clauses() {
        let id = DocumentId::new();
        let other = DocumentId::new();
        let stored = doc(json!({ "_id": id.to_string() }));

        assert!(Filter::by_id(id).matches(&stored));
        assert!(!Filter::by_id(other).matches(&stored));
        assert!(Filter::all().id_in(vec![other, id]).matches(&stored));
        assert!(!Filter::all().id_in(vec![]).matches(&stored));
    }
}
