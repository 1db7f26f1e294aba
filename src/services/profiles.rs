//! Viewer profile lifecycle and mutations.
//!
//! A profile is either absent or present for a given uid. Reading a profile
//! through [`get_or_create_profile`] provisions it on first access, so a GET
//! may write. The mutations ([`toggle_favorite`], [`update_history`]) do not
//! provision and fail with `NotFound` for unknown uids.
//!
//! Mutations are read-modify-write over the whole favorites/history field.
//! Concurrent writers for the same uid race and the last write wins.

use serde_json::{Map, Value};

use crate::{
    db::{Collection, Document, DocumentStore, Filter},
    error::{AppError, AppResult},
    models::{FavoriteAction, UserProfile, WatchEntry},
};

fn by_uid(uid: &str) -> Filter {
    Filter::all().eq("uid", uid)
}

fn profile_from_document(doc: Document) -> AppResult<UserProfile> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

fn profile_not_found() -> AppError {
    AppError::NotFound("Profile not found".to_string())
}

/// Loads an existing profile
pub async fn find_profile(store: &dyn DocumentStore, uid: &str) -> AppResult<Option<UserProfile>> {
    store
        .find_one(Collection::UserProfile, &by_uid(uid))
        .await?
        .map(profile_from_document)
        .transpose()
}

/// Returns the profile for `uid`, inserting an empty one if none exists
pub async fn get_or_create_profile(store: &dyn DocumentStore, uid: &str) -> AppResult<UserProfile> {
    if let Some(profile) = find_profile(store, uid).await? {
        return Ok(profile);
    }

    let Value::Object(document) = serde_json::to_value(UserProfile::new(uid))? else {
        return Err(AppError::Internal("profile did not serialize to an object".to_string()));
    };

    match store.insert(Collection::UserProfile, document).await {
        Ok(id) => tracing::info!(uid = %uid, id = %id, "Provisioned user profile"),
        // Another request created it first
        Err(AppError::Conflict(_)) => {
            tracing::debug!(uid = %uid, "Profile created concurrently, re-reading")
        }
        Err(e) => return Err(e),
    }

    find_profile(store, uid)
        .await?
        .ok_or_else(|| AppError::Internal(format!("profile for {} vanished after insert", uid)))
}

async fn save_field(store: &dyn DocumentStore, uid: &str, field: &str, value: Value) -> AppResult<()> {
    let mut set = Map::new();
    set.insert(field.to_string(), value);

    let matched = store
        .update_one(Collection::UserProfile, &by_uid(uid), set)
        .await?;
    if matched == 0 {
        return Err(profile_not_found());
    }
    Ok(())
}

/// Adds `content_id` to the favorites set, or removes it if present
pub async fn toggle_favorite(
    store: &dyn DocumentStore,
    uid: &str,
    content_id: &str,
) -> AppResult<FavoriteAction> {
    let mut profile = find_profile(store, uid)
        .await?
        .ok_or_else(profile_not_found)?;

    let action = profile.toggle_favorite(content_id);
    save_field(store, uid, "favorites", serde_json::to_value(&profile.favorites)?).await?;

    tracing::info!(uid = %uid, content_id = %content_id, action = ?action, "Toggled favorite");
    Ok(action)
}

/// Records watch progress, replacing any earlier entry for the same content
pub async fn update_history(store: &dyn DocumentStore, uid: &str, entry: WatchEntry) -> AppResult<()> {
    entry.validate()?;

    let mut profile = find_profile(store, uid)
        .await?
        .ok_or_else(profile_not_found)?;

    tracing::debug!(uid = %uid, content_id = %entry.content_id, progress = entry.progress, "Updating watch history");
    profile.upsert_history(entry);
    save_field(store, uid, "history", serde_json::to_value(&profile.history)?).await
}
