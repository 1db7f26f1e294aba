use serde::Deserialize;
use serde_json::Value;

use crate::{
    db::{Collection, Document, DocumentStore, Filter, FindOptions},
    error::{AppError, AppResult},
    models::{decode, Content, ContentIn, DocumentId},
};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Query-string parameters for the public catalog listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentQuery {
    /// Case-insensitive title substring
    pub q: Option<String>,
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<u64>,
}

impl ContentQuery {
    /// Unfiltered listing of the newest `limit` entries
    pub fn latest(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn effective_limit(&self) -> u64 {
        clamp_limit(self.limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Predicate for this query, on top of the published restriction
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::all();
        if let Some(q) = non_empty(&self.q) {
            filter = filter.contains_ignore_case("title", q);
        }
        if let Some(genre) = non_empty(&self.genre) {
            filter = filter.has_element("genres", genre);
        }
        if let Some(content_type) = non_empty(&self.content_type) {
            filter = filter.eq("type", content_type);
        }
        filter
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub fn clamp_limit(limit: u64) -> u64 {
    limit.min(MAX_LIMIT)
}

/// Filter every public read path starts from
pub fn published() -> Filter {
    Filter::all().eq("is_published", true)
}

/// Converts a stored document into the outward content shape
pub fn content_from_document(doc: Document) -> AppResult<Content> {
    Ok(serde_json::from_value(Value::Object(decode(doc)))?)
}

/// Published content matching `filter`, newest first
pub async fn query_published(
    store: &dyn DocumentStore,
    filter: Filter,
    skip: u64,
    limit: u64,
) -> AppResult<Vec<Content>> {
    let mut restricted = published();
    for clause in filter.clauses() {
        restricted = restricted.with(clause.clone());
    }

    let docs = store
        .find(
            Collection::Content,
            &restricted,
            FindOptions::newest(skip, clamp_limit(limit)),
        )
        .await?;

    Ok(docs
        .into_iter()
        .filter_map(|doc| match content_from_document(doc) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed content document");
                None
            }
        })
        .collect())
}

/// Runs a catalog listing query against the store
pub async fn find_content(store: &dyn DocumentStore, query: &ContentQuery) -> AppResult<Vec<Content>> {
    query_published(store, query.filter(), query.skip, query.effective_limit()).await
}

/// Catalog listing for public traffic. Never fails: a missing or failing
/// store yields an empty page.
pub async fn list_content(store: Option<&dyn DocumentStore>, query: &ContentQuery) -> Vec<Content> {
    let Some(store) = store else {
        tracing::debug!("No document store configured, returning empty listing");
        return Vec::new();
    };

    match find_content(store, query).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Content listing failed, serving empty result");
            Vec::new()
        }
    }
}

/// Validates and stores a new catalog entry, returning its id
pub async fn create_content(store: &dyn DocumentStore, input: ContentIn) -> AppResult<DocumentId> {
    input.validate()?;

    let Value::Object(document) = serde_json::to_value(&input)? else {
        return Err(AppError::Internal("content did not serialize to an object".to_string()));
    };
    let id = store.insert(Collection::Content, document).await?;

    tracing::info!(id = %id, title = %input.title, "Created content");
    Ok(id)
}

/// Looks up a single entry; malformed ids read as not found
pub async fn get_content(store: &dyn DocumentStore, raw_id: &str) -> AppResult<Content> {
    let id = DocumentId::parse(raw_id)?;
    let doc = store
        .find_one(Collection::Content, &Filter::by_id(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    content_from_document(doc)
}

/// Removes an entry; zero documents deleted is reported as not found
pub async fn delete_content(store: &dyn DocumentStore, raw_id: &str) -> AppResult<()> {
    let id = DocumentId::parse(raw_id)?;
    let deleted = store
        .delete_one(Collection::Content, &Filter::by_id(id))
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    tracing::info!(id = %id, "Deleted content");
    Ok(())
}
