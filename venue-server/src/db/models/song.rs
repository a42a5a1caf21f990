//! Song Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Song ID type
pub type SongId = RecordId;

/// Popularity score bounds
pub const POPULARITY_MIN: i64 = 0;
pub const POPULARITY_MAX: i64 = 100;

/// Song model matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<SongId>,
    pub title: String,
    pub artist: String,
    /// Unique numeric catalog code (natural key for bulk import)
    pub code: i64,
    /// Non-empty genre list
    pub genres: Vec<String>,
    pub language: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_true")]
    pub indexed: bool,
    /// Clamped to [0, 100]
    #[serde(default)]
    pub popularity: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Song {
    /// Clamp popularity into its valid range
    pub fn clamp_popularity(value: i64) -> i64 {
        value.clamp(POPULARITY_MIN, POPULARITY_MAX)
    }
}

/// Create song payload
#[derive(Debug, Clone, Deserialize)]
pub struct SongCreate {
    pub title: String,
    pub artist: String,
    pub code: i64,
    pub genres: Vec<String>,
    pub language: String,
    pub indexed: Option<bool>,
    pub popularity: Option<i64>,
}

/// Update song payload
#[derive(Debug, Clone, Deserialize)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genres: Option<Vec<String>>,
    pub language: Option<String>,
    pub indexed: Option<bool>,
    pub popularity: Option<i64>,
}
