use serde_json::Value;

use crate::{
    db::{Collection, DocumentStore, Filter, FindOptions},
    error::AppResult,
    models::AdminMetrics,
};

/// Counts content (published or not), profiles, and favorites across profiles
pub async fn collect_metrics(store: &dyn DocumentStore) -> AppResult<AdminMetrics> {
    let content_count = store.count(Collection::Content, &Filter::all()).await?;
    let users = store.count(Collection::UserProfile, &Filter::all()).await?;

    let profiles = store
        .find(Collection::UserProfile, &Filter::all(), FindOptions::default())
        .await?;
    let favorites = profiles
        .iter()
        .filter_map(|doc| doc.get("favorites").and_then(Value::as_array))
        .map(|favs| favs.len() as u64)
        .sum();

    Ok(AdminMetrics {
        content_count,
        users,
        favorites,
    })
}

/// Admin counters; all zero when the store is missing or failing
pub async fn admin_metrics(store: Option<&dyn DocumentStore>) -> AdminMetrics {
    let Some(store) = store else {
        return AdminMetrics::default();
    };

    collect_metrics(store).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Metrics collection failed, reporting zeros");
        AdminMetrics::default()
    })
}
