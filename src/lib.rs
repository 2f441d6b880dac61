//! Moodtune Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod mood_cache;
pub mod recommend;
pub mod sentiment;
pub mod server;
pub mod sqlite_persistence;
pub mod suggestions;

// Re-export commonly used types for convenience
pub use catalog::{MusicCatalog, SpotifyClient};
pub use mood_cache::{MoodCacheStore, SqliteMoodCacheStore};
pub use recommend::Recommender;
pub use sentiment::{GeminiClient, SentimentAnalyzer};
pub use server::{make_app, run_server};
pub use suggestions::{SqliteSuggestionStore, SuggestionStore};
