//! Orchestrates the mood-to-songs pipeline: cache lookup, sentiment
//! classification, catalog search and feature enrichment.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::catalog::MusicCatalog;
use crate::enrichment::{enrich_track, EnrichedTrack};
use crate::mood_cache::MoodCacheStore;
use crate::sentiment::{ClassificationError, MoodSentiment, SentimentAnalyzer};

/// How many tracks to request from the catalog on a cache miss.
const SEARCH_LIMIT: usize = 15;
/// How many songs a recommendation carries.
const RESPONSE_SONGS: usize = 5;
/// Concurrent audio feature fetches per request.
const FEATURE_FETCH_CONCURRENCY: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum RecommendError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub sentiment: MoodSentiment,
    pub songs: Vec<EnrichedTrack>,
    pub cache_hit: bool,
}

pub struct Recommender {
    analyzer: Arc<dyn SentimentAnalyzer>,
    catalog: Arc<dyn MusicCatalog>,
    cache: Arc<dyn MoodCacheStore>,
}

impl Recommender {
    pub fn new(
        analyzer: Arc<dyn SentimentAnalyzer>,
        catalog: Arc<dyn MusicCatalog>,
        cache: Arc<dyn MoodCacheStore>,
    ) -> Self {
        Self {
            analyzer,
            catalog,
            cache,
        }
    }

    /// Turn a free-text mood into a sentiment and a song list. Serves from
    /// cache when another user already asked for the same mood; otherwise
    /// classifies, searches the catalog and caches the result.
    ///
    /// Cache failures degrade to a miss, catalog failures degrade to fewer
    /// songs. Only a blank mood or a classification failure is an error.
    pub async fn recommend(
        &self,
        mood_text: &str,
        user_id: Option<&str>,
    ) -> Result<Recommendation, RecommendError> {
        let mood_text = mood_text.trim();
        if mood_text.is_empty() {
            return Err(RecommendError::Validation(
                "Mood text must not be blank".to_string(),
            ));
        }

        let cached = match self.cache.find_similar(mood_text, user_id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Mood cache lookup failed, treating as miss: {}", e);
                None
            }
        };

        if let Some(entry) = cached {
            debug!("Cache hit for mood key '{}'", entry.mood_key);
            if let Err(e) = self.cache.mark_accessed(entry.id) {
                warn!("Failed to bump cache access count: {}", e);
            }
            let songs = entry.sample_songs(RESPONSE_SONGS);
            return Ok(Recommendation {
                sentiment: entry.sentiment,
                songs,
                cache_hit: true,
            });
        }

        let sentiment = self.analyzer.classify(mood_text).await?;
        debug!(
            "Classified mood as {} (score {}, genre {})",
            sentiment.emotion, sentiment.score, sentiment.genre
        );

        let tracks = self
            .catalog
            .search(sentiment.emotion, &sentiment.genre, SEARCH_LIMIT)
            .await;

        let enriched: Vec<EnrichedTrack> = stream::iter(tracks)
            .map(|track| {
                let catalog = Arc::clone(&self.catalog);
                async move {
                    let features = catalog.audio_features(&track.id).await;
                    enrich_track(track, features)
                }
            })
            .buffered(FEATURE_FETCH_CONCURRENCY)
            .collect()
            .await;

        if let Err(e) = self
            .cache
            .store_entry(mood_text, &sentiment, &enriched, user_id)
        {
            warn!("Failed to cache mood entry: {}", e);
        }

        let songs = enriched.into_iter().take(RESPONSE_SONGS).collect();
        Ok(Recommendation {
            sentiment,
            songs,
            cache_hit: false,
        })
    }
}
