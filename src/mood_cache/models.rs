use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::enrichment::EnrichedTrack;
use crate::sentiment::MoodSentiment;

/// A cached mood classification together with its enriched song list.
#[derive(Debug, Clone)]
pub struct MoodCacheEntry {
    pub id: i64,
    pub mood_key: String,
    pub sentiment: MoodSentiment,
    pub songs: Vec<EnrichedTrack>,
    pub contributor_id: Option<String>,
    pub access_count: i64,
    pub last_accessed_at: i64,
    pub created_at: i64,
}

impl MoodCacheEntry {
    /// Pick up to `n` distinct songs from the entry at random.
    pub fn sample_songs(&self, n: usize) -> Vec<EnrichedTrack> {
        let mut rng = rand::rng();
        self.songs
            .choose_multiple(&mut rng, n)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopMood {
    pub mood: String,
    pub access_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_cached_moods: usize,
    /// Sum of all access counts.
    pub total_cache_hits: i64,
    /// Percentage of requests answered from cache, rounded to 2 decimals.
    pub cache_efficiency_percent: f64,
    pub most_popular_moods: Vec<TopMood>,
}
