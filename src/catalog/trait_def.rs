use async_trait::async_trait;

use super::types::{AudioFeatureScores, CatalogTrack};
use crate::sentiment::Emotion;

/// External music catalog. Both operations fail open: a catalog outage
/// degrades results instead of failing the request.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Search for tracks matching the emotion and genre. Returns an empty
    /// vec on any catalog failure.
    async fn search(&self, emotion: Emotion, genre: &str, limit: usize) -> Vec<CatalogTrack>;

    /// Fetch audio features for one track. Returns None on any failure.
    async fn audio_features(&self, track_id: &str) -> Option<AudioFeatureScores>;
}
