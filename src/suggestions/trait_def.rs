use anyhow::Result;

use super::models::{SuggestedSong, SuggestionRecord};

/// Per-user history of saved song suggestions.
pub trait SuggestionStore: Send + Sync {
    /// Save one suggestion for a user. The song row is shared across users
    /// and created on first sight of its spotify id.
    fn save_suggestion(
        &self,
        user_id: &str,
        song: &SuggestedSong,
        mood: &str,
        mood_description: Option<&str>,
    ) -> Result<()>;

    /// The user's most recent suggestions, newest first.
    fn recent_suggestions(&self, user_id: &str, limit: usize) -> Result<Vec<SuggestionRecord>>;
}
