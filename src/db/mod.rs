use serde_json::{Map, Value};
use std::fmt::Display;

use crate::{error::AppResult, models::DocumentId};

pub mod filter;
pub mod memory;
pub mod postgres;

pub use filter::{Clause, Filter};
pub use memory::MemoryStore;
pub use postgres::{create_pool, PgDocumentStore};

/// Schema-less record as held by the document store
pub type Document = Map<String, Value>;

pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Collections known to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Content,
    UserProfile,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Content, Collection::UserProfile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Content => "content",
            Collection::UserProfile => "userprofile",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Paging and ordering for `find`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
    /// Descending `created_at`, ties broken newest-insert first
    pub newest_first: bool,
}

impl FindOptions {
    pub fn newest(skip: u64, limit: u64) -> Self {
        Self {
            skip,
            limit: Some(limit),
            newest_first: true,
        }
    }
}

/// Document database the service reads and writes through
///
/// Every call is its own unit of work; implementations give no guarantees
/// across calls. Returned documents carry the store id in `_id`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, paged and ordered per `options`
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> AppResult<Vec<Document>>;

    /// First matching document in natural order
    async fn find_one(&self, collection: Collection, filter: &Filter)
        -> AppResult<Option<Document>>;

    /// Stores a new document and returns its assigned id.
    ///
    /// Stamps `created_at` (unless already present) and `updated_at`.
    async fn insert(&self, collection: Collection, document: Document) -> AppResult<DocumentId>;

    /// Merges `set` into the first matching document, returning the number matched
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> AppResult<u64>;

    /// Removes the first matching document, returning the number deleted
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<u64>;

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<u64>;

    /// Names of the collections present in the backing database
    async fn list_collections(&self) -> AppResult<Vec<String>>;

    /// Short backend name for diagnostics
    fn backend(&self) -> &'static str;
}

/// Current time in the string form documents store timestamps in
pub fn timestamp_now() -> Value {
    Value::String(
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
    )
}
