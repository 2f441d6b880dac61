use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::session::{MaybeUserId, UserId};
use super::state::{
    GuardedMoodCacheStore, GuardedRecommender, GuardedSuggestionStore, ServerState,
};
use crate::enrichment::EnrichedTrack;
use crate::recommend::RecommendError;
use crate::sentiment::MoodSentiment;
use crate::suggestions::SuggestedSong;

const RECENT_SUGGESTIONS_LIMIT: usize = 15;

#[derive(Deserialize, Debug)]
pub struct AnalyzeMoodBody {
    pub mood_input: String,
}

#[derive(Serialize)]
struct CacheInfo {
    cache_hit: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct AnalyzeMoodResponse {
    sentiment: MoodSentiment,
    songs: Vec<EnrichedTrack>,
    cache_hit: bool,
    cache_info: CacheInfo,
}

pub async fn analyze_mood(
    MaybeUserId(user_id): MaybeUserId,
    State(recommender): State<GuardedRecommender>,
    Json(body): Json<AnalyzeMoodBody>,
) -> Response {
    match recommender
        .recommend(&body.mood_input, user_id.as_deref())
        .await
    {
        Ok(recommendation) => {
            let cache_info = CacheInfo {
                cache_hit: recommendation.cache_hit,
                message: if recommendation.cache_hit {
                    "Loaded from cache"
                } else {
                    "Fresh analysis"
                },
            };
            Json(AnalyzeMoodResponse {
                sentiment: recommendation.sentiment,
                songs: recommendation.songs,
                cache_hit: recommendation.cache_hit,
                cache_info,
            })
            .into_response()
        }
        Err(RecommendError::Validation(message)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": message })),
        )
            .into_response(),
        Err(RecommendError::Classification(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": e.to_string(), "kind": e.kind() })),
        )
            .into_response(),
    }
}

#[derive(Deserialize, Debug)]
pub struct SaveSuggestionsBody {
    pub mood: String,
    pub mood_description: Option<String>,
    pub songs: Vec<SuggestedSong>,
}

#[derive(Serialize)]
struct SaveSuggestionError {
    song: String,
    error: String,
}

#[derive(Serialize)]
struct SaveSuggestionsResponse {
    message: String,
    saved_count: usize,
    errors: Vec<SaveSuggestionError>,
}

pub async fn create_suggestions(
    UserId(user_id): UserId,
    State(suggestions): State<GuardedSuggestionStore>,
    Json(body): Json<SaveSuggestionsBody>,
) -> Response {
    let mood = body.mood.trim();
    if mood.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Mood must not be blank" })),
        )
            .into_response();
    }

    let mut saved_count = 0;
    let mut errors = Vec::new();
    for song in &body.songs {
        match suggestions.save_suggestion(&user_id, song, mood, body.mood_description.as_deref()) {
            Ok(()) => saved_count += 1,
            Err(e) => {
                error!("Failed to save suggestion {}: {}", song.spotify_id, e);
                errors.push(SaveSuggestionError {
                    song: song.spotify_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    (
        StatusCode::CREATED,
        Json(SaveSuggestionsResponse {
            message: format!("Saved {} of {} songs", saved_count, body.songs.len()),
            saved_count,
            errors,
        }),
    )
        .into_response()
}

pub async fn recent_suggestions(
    UserId(user_id): UserId,
    State(suggestions): State<GuardedSuggestionStore>,
) -> Response {
    match suggestions.recent_suggestions(&user_id, RECENT_SUGGESTIONS_LIMIT) {
        Ok(records) => Json(json!({ "suggestions": records })).into_response(),
        Err(e) => {
            error!("Failed to load recent suggestions: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn cache_stats(
    UserId(_user_id): UserId,
    State(mood_cache): State<GuardedMoodCacheStore>,
) -> Response {
    match mood_cache.stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to compute cache stats: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn format_uptime(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

pub async fn health(State(state): State<ServerState>) -> Response {
    Json(json!({
        "status": "OK",
        "uptime": format_uptime(state.start_time.elapsed()),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        let d = std::time::Duration::from_secs(86_400 + 3600 + 61);
        assert_eq!(format_uptime(d), "1d 01:01:01");
        assert_eq!(format_uptime(std::time::Duration::ZERO), "0d 00:00:00");
    }
}
