use std::collections::BTreeSet;

use serde::Deserialize;

use crate::{
    db::{Collection, DocumentStore, Filter, FindOptions},
    error::AppResult,
    models::{Content, DocumentId},
    services::{
        catalog::{self, clamp_limit, ContentQuery},
        profiles,
    },
};

pub const DEFAULT_RECOMMENDATION_LIMIT: u64 = 12;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    pub uid: Option<String>,
    pub limit: Option<u64>,
}

impl RecommendationQuery {
    pub fn effective_limit(&self) -> u64 {
        clamp_limit(self.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT))
    }
}

/// Union of genres across the favorited content that still exists.
///
/// Favorites that are not well-formed ids are skipped silently.
pub async fn interest_genres(
    store: &dyn DocumentStore,
    favorites: &[String],
) -> AppResult<BTreeSet<String>> {
    let ids: Vec<DocumentId> = favorites
        .iter()
        .filter_map(|raw| DocumentId::parse(raw).ok())
        .collect();
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    let docs = store
        .find(
            Collection::Content,
            &Filter::all().id_in(ids),
            FindOptions::default(),
        )
        .await?;

    Ok(docs
        .iter()
        .filter_map(|doc| doc.get("genres").and_then(|g| g.as_array()))
        .flatten()
        .filter_map(|g| g.as_str().map(str::to_string))
        .collect())
}

/// Suggests published content sharing a genre with the user's favorites.
///
/// Anonymous users, unknown users, users without favorites and users whose
/// favorites carry no genres all get the plain newest-first listing.
/// Favorited items themselves are not excluded.
pub async fn find_recommendations(
    store: &dyn DocumentStore,
    uid: Option<&str>,
    limit: u64,
) -> AppResult<Vec<Content>> {
    let favorites = match uid {
        Some(uid) => profiles::find_profile(store, uid)
            .await?
            .map(|p| p.favorites)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let genres = if favorites.is_empty() {
        BTreeSet::new()
    } else {
        interest_genres(store, &favorites).await?
    };

    if genres.is_empty() {
        tracing::debug!(uid = ?uid, "No genre signal, falling back to latest content");
        return catalog::find_content(store, &ContentQuery::latest(limit)).await;
    }

    tracing::debug!(uid = ?uid, genres = ?genres, "Recommending by genre overlap");
    let filter = Filter::all().any_element_of("genres", genres.into_iter().collect());
    catalog::query_published(store, filter, 0, limit).await
}

/// Recommendations for public traffic. Store absence or faults yield an
/// empty list.
pub async fn recommend(store: Option<&dyn DocumentStore>, query: &RecommendationQuery) -> Vec<Content> {
    let Some(store) = store else {
        return Vec::new();
    };

    match find_recommendations(store, query.uid.as_deref(), query.effective_limit()).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, uid = ?query.uid, "Recommendations failed, serving empty result");
            Vec::new()
        }
    }
}
