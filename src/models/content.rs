use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;
pub const MAX_RATING: f64 = 10.0;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

/// Movie or series metadata as submitted by catalog editors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentIn {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub maturity_rating: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Number of seasons, series only
    #[serde(default)]
    pub seasons: Option<u32>,
    /// Episode listing for series, entries like `{season, episode, title, duration}`
    #[serde(default)]
    pub episodes: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    #[serde(default)]
    pub popularity: i64,
}

fn default_published() -> bool {
    true
}

impl ContentIn {
    /// Minimal published entry, mostly useful for seeding and tests
    pub fn new(title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            title: title.into(),
            description: None,
            content_type,
            genres: Vec::new(),
            year: None,
            rating: None,
            maturity_rating: None,
            poster_url: None,
            backdrop_url: None,
            trailer_url: None,
            stream_url: None,
            duration_minutes: None,
            seasons: None,
            episodes: None,
            cast: Vec::new(),
            director: None,
            tags: Vec::new(),
            metadata: Map::new(),
            is_published: true,
            popularity: 0,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }

    /// Range and presence checks applied before anything reaches the store
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidInput("title must not be empty".to_string()));
        }
        if let Some(year) = self.year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(AppError::InvalidInput(format!(
                    "year must be between {} and {}",
                    MIN_YEAR, MAX_YEAR
                )));
            }
        }
        if let Some(rating) = self.rating {
            if !(0.0..=MAX_RATING).contains(&rating) {
                return Err(AppError::InvalidInput(
                    "rating must be between 0 and 10".to_string(),
                ));
            }
        }
        if self.duration_minutes == Some(0) {
            return Err(AppError::InvalidInput(
                "duration_minutes must be at least 1".to_string(),
            ));
        }
        if self.seasons == Some(0) {
            return Err(AppError::InvalidInput("seasons must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Catalog entry as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub id: String,
    #[serde(flatten)]
    pub fields: ContentIn,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
