use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::mood_cache::MoodCacheStore;
use crate::recommend::Recommender;
use crate::suggestions::SuggestionStore;

pub type GuardedRecommender = Arc<Recommender>;
pub type GuardedMoodCacheStore = Arc<dyn MoodCacheStore>;
pub type GuardedSuggestionStore = Arc<dyn SuggestionStore>;

#[derive(Clone)]
pub struct ServerState {
    pub start_time: Instant,
    pub recommender: GuardedRecommender,
    pub mood_cache: GuardedMoodCacheStore,
    pub suggestions: GuardedSuggestionStore,
}

impl FromRef<ServerState> for GuardedRecommender {
    fn from_ref(input: &ServerState) -> Self {
        input.recommender.clone()
    }
}

impl FromRef<ServerState> for GuardedMoodCacheStore {
    fn from_ref(input: &ServerState) -> Self {
        input.mood_cache.clone()
    }
}

impl FromRef<ServerState> for GuardedSuggestionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.suggestions.clone()
    }
}
