use serde::{Deserialize, Serialize};

pub mod content;
pub mod id;
pub mod user_profile;

pub use content::{Content, ContentIn, ContentType};
pub use id::{decode, DocumentId};
pub use user_profile::{FavoriteAction, HistoryUpdate, UserProfile, WatchEntry};

/// Catalog-wide counters for the admin dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminMetrics {
    /// All content documents, published or not
    pub content_count: u64,
    pub users: u64,
    /// Sum of favorites across every profile
    pub favorites: u64,
}
