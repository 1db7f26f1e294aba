use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// One stored history entry.
///
/// Entries may carry keys this service does not manage (written by other
/// clients of the same store); they are kept in `extra` and written back
/// untouched. A stored entry without `progress` reads as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchEntry {
    /// Content id; not checked against the catalog
    pub content_id: String,
    /// Fraction watched, within [0, 1]
    #[serde(default)]
    pub progress: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchEntry {
    pub fn new(content_id: impl Into<String>, progress: f64) -> Self {
        Self {
            content_id: content_id.into(),
            progress,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.progress) {
            return Err(AppError::InvalidInput(
                "progress must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of a watch progress report; both fields are required
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryUpdate {
    pub content_id: String,
    pub progress: f64,
}

impl From<HistoryUpdate> for WatchEntry {
    fn from(update: HistoryUpdate) -> Self {
        WatchEntry::new(update.content_id, update.progress)
    }
}

/// Outcome of a favorite toggle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Added,
    Removed,
}

/// Viewer profile keyed by external uid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Content ids, treated as a set
    #[serde(default)]
    pub favorites: Vec<String>,
    /// At most one entry per content id
    #[serde(default)]
    pub history: Vec<WatchEntry>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl UserProfile {
    /// Empty profile used when a uid is seen for the first time
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            avatar_url: None,
            favorites: Vec::new(),
            history: Vec::new(),
            preferences: Map::new(),
        }
    }

    /// Adds the content id to favorites, or removes it if already present
    pub fn toggle_favorite(&mut self, content_id: &str) -> FavoriteAction {
        if self.favorites.iter().any(|f| f == content_id) {
            self.favorites.retain(|f| f != content_id);
            FavoriteAction::Removed
        } else {
            self.favorites.push(content_id.to_string());
            FavoriteAction::Added
        }
    }

    /// Overwrites progress for a known content id in place, or appends.
    /// Other keys on an existing entry are left as they were.
    pub fn upsert_history(&mut self, entry: WatchEntry) {
        if let Some(existing) = self
            .history
            .iter_mut()
            .find(|h| h.content_id == entry.content_id)
        {
            existing.progress = entry.progress;
        } else {
            self.history.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_profile_is_empty() {
        let profile = UserProfile::new("u1");
        assert_eq!(profile.uid, "u1");
        assert!(profile.favorites.is_empty());
        assert!(profile.history.is_empty());
        assert!(profile.preferences.is_empty());
    }

    #[test]
    fn test_toggle_favorite_is_involution() {
        let mut profile = UserProfile::new("u1");
        profile.favorites.push("a".to_string());
        let original = profile.favorites.clone();

        assert_eq!(profile.toggle_favorite("b"), FavoriteAction::Added);
        assert_eq!(profile.toggle_favorite("b"), FavoriteAction::Removed);
        assert_eq!(profile.favorites, original);

        assert_eq!(profile.toggle_favorite("a"), FavoriteAction::Removed);
        assert_eq!(profile.toggle_favorite("a"), FavoriteAction::Added);
    }

    #[test]
    fn test_toggle_favorite_removes_stray_duplicates() {
        let mut profile = UserProfile::new("u1");
        profile.favorites = vec!["a".to_string(), "a".to_string()];
        assert_eq!(profile.toggle_favorite("a"), FavoriteAction::Removed);
        assert!(profile.favorites.is_empty());
    }

    #[test]
    fn test_upsert_history_keeps_position() {
        let mut profile = UserProfile::new("u1");
        profile.upsert_history(WatchEntry::new("a", 0.1));
        profile.upsert_history(WatchEntry::new("b", 0.2));
        profile.upsert_history(WatchEntry::new("a", 0.9));

        assert_eq!(
            profile.history,
            vec![WatchEntry::new("a", 0.9), WatchEntry::new("b", 0.2)]
        );
    }

    #[test]
    fn test_upsert_history_keeps_unmanaged_keys() {
        let mut profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1",
            "history": [
                { "content_id": "a", "progress": 0.2, "completed": false, "device": "tv" }
            ]
        }))
        .unwrap();

        profile.upsert_history(WatchEntry::new("a", 0.6));

        let history = serde_json::to_value(&profile.history).unwrap();
        assert_eq!(
            history,
            json!([{ "content_id": "a", "progress": 0.6, "completed": false, "device": "tv" }])
        );
    }

    #[test]
    fn test_stored_entry_without_progress_reads_as_zero() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1",
            "history": [{ "content_id": "a", "watched_at": "2024-05-01" }]
        }))
        .unwrap();

        assert_eq!(profile.history[0].progress, 0.0);
        assert_eq!(profile.history[0].extra["watched_at"], "2024-05-01");
    }

    #[test]
    fn test_history_update_requires_progress() {
        let missing: Result<HistoryUpdate, _> = serde_json::from_value(json!({ "content_id": "a" }));
        assert!(missing.is_err());

        let update: HistoryUpdate =
            serde_json::from_value(json!({ "content_id": "a", "progress": 0.5 })).unwrap();
        assert_eq!(WatchEntry::from(update), WatchEntry::new("a", 0.5));
    }

    #[test]
    fn test_watch_entry_progress_bounds() {
        assert!(WatchEntry::new("a", 0.0).validate().is_ok());
        assert!(WatchEntry::new("a", 1.0).validate().is_ok());
        assert!(WatchEntry::new("a", 1.5).validate().is_err());
        assert!(WatchEntry::new("a", -0.1).validate().is_err());
        assert!(WatchEntry::new("a", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_favorite_action_serialization() {
        assert_eq!(serde_json::to_string(&FavoriteAction::Added).unwrap(), "\"added\"");
        assert_eq!(serde_json::to_string(&FavoriteAction::Removed).unwrap(), "\"removed\"");
    }
}
