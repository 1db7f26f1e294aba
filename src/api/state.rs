use std::sync::Arc;

use crate::{
    db::DocumentStore,
    error::{AppError, AppResult},
};

/// Shared application state
///
/// `store` is `None` when no database is configured; read endpoints then
/// serve empty results and write endpoints fail.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    /// State with no backing store
    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    /// The configured store, for paths that must not degrade
    pub fn store(&self) -> AppResult<&dyn DocumentStore> {
        self.store.as_deref().ok_or(AppError::StoreUnavailable)
    }

    /// The configured store, if any, for paths that degrade to empty results
    pub fn optional_store(&self) -> Option<&dyn DocumentStore> {
        self.store.as_deref()
    }
}
