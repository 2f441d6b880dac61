use serde::{Deserialize, Serialize};

/// A song a user asked to save to their suggestion history.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedSong {
    pub spotify_id: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: Option<u64>,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub album: Option<String>,
}

/// One entry of a user's suggestion history, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRecord {
    pub spotify_id: String,
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub album: Option<String>,
    pub embed_url: String,
    pub mood: String,
    pub mood_description: Option<String>,
    /// RFC 3339 timestamp of when the suggestion was saved.
    pub suggested_at: String,
}
