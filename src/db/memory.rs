use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    timestamp_now, Collection, Document, DocumentStore, Filter, FindOptions, CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
};
use crate::{
    error::{AppError, AppResult},
    models::{id::STORE_ID_FIELD, DocumentId},
};

/// In-process document store
///
/// Documents live in insertion order per collection. The lock is only held
/// for the duration of a single operation.
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    unique_keys: HashMap<Collection, &'static str>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store enforcing one profile per uid
    pub fn new() -> Self {
        let mut unique_keys = HashMap::new();
        unique_keys.insert(Collection::UserProfile, "uid");

        Self {
            collections: RwLock::new(HashMap::new()),
            unique_keys,
        }
    }

    fn violates_unique_key(&self, collection: Collection, docs: &[Document], doc: &Document) -> bool {
        let Some(key) = self.unique_keys.get(&collection) else {
            return false;
        };
        match doc.get(*key) {
            Some(value) if !value.is_null() => docs.iter().any(|d| d.get(*key) == Some(value)),
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = docs.iter().filter(|d| filter.matches(d)).collect();

        if options.newest_first {
            // Reverse first so the stable sort leaves later inserts ahead on ties
            matched.reverse();
            matched.sort_by(|a, b| created_at(b).cmp(created_at(a)));
        }

        let limit = options.limit.map_or(usize::MAX, |l| l as usize);
        Ok(matched
            .into_iter()
            .skip(options.skip as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn insert(&self, collection: Collection, mut document: Document) -> AppResult<DocumentId> {
        let id = DocumentId::new();
        let now = timestamp_now();
        document.insert(STORE_ID_FIELD.to_string(), Value::String(id.to_string()));
        document
            .entry(CREATED_AT_FIELD.to_string())
            .or_insert_with(|| now.clone());
        document.insert(UPDATED_AT_FIELD.to_string(), now);

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if self.violates_unique_key(collection, docs, &document) {
            return Err(AppError::Conflict(format!(
                "duplicate key in collection {}",
                collection
            )));
        }
        docs.push(document);

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(0);
        };

        for (key, value) in set {
            if key != STORE_ID_FIELD {
                doc.insert(key, value);
            }
        }
        doc.insert(UPDATED_AT_FIELD.to_string(), timestamp_now());

        Ok(1)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map_or(0, |docs| docs.iter().filter(|d| filter.matches(d)).count() as u64))
    }

    async fn list_collections(&self) -> AppResult<Vec<String>> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().map(|c| c.as_str().to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

fn created_at(doc: &Document) -> &str {
    doc.get(CREATED_AT_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}
