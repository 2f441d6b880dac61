//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases and mocked
//! external services, so no network traffic leaves the process.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::net::TcpListener;

use moodtune_server::catalog::{AudioFeatureScores, CatalogTrack, MusicCatalog};
use moodtune_server::mood_cache::{MoodCacheStore, SqliteMoodCacheStore};
use moodtune_server::recommend::Recommender;
use moodtune_server::sentiment::{
    ClassificationError, Emotion, MoodSentiment, SentimentAnalyzer,
};
use moodtune_server::server::make_app;
use moodtune_server::server::state::ServerState;
use moodtune_server::suggestions::{SqliteSuggestionStore, SuggestionStore};

const SERVER_READY_TIMEOUT_MS: u64 = 5000;
const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Mock sentiment analyzer - always classifies as a happy Pop mood and
/// counts how often it was called.
struct MockAnalyzer {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl SentimentAnalyzer for MockAnalyzer {
    async fn classify(&self, _text: &str) -> Result<MoodSentiment, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClassificationError::RateLimited);
        }
        Ok(MoodSentiment {
            score: 85,
            label: "Feeling great".to_string(),
            emotion: Emotion::Happy,
            genre: "Pop".to_string(),
        })
    }
}

/// Mock catalog - returns a fixed set of 15 tracks with high-energy features.
struct MockCatalog;

#[async_trait]
impl MusicCatalog for MockCatalog {
    async fn search(&self, _emotion: Emotion, _genre: &str, limit: usize) -> Vec<CatalogTrack> {
        (0..15.min(limit))
            .map(|i| CatalogTrack {
                id: format!("t{}", i),
                title: format!("Song {}", i),
                artist: "Test Artist".to_string(),
                duration_ms: Some(215_000),
                uri: format!("spotify:track:t{}", i),
                external_url: format!("https://open.spotify.com/track/t{}", i),
                image_url: Some("https://img.example/cover.jpg".to_string()),
                preview_url: None,
                album: "Test Album".to_string(),
            })
            .collect()
    }

    async fn audio_features(&self, _track_id: &str) -> Option<AudioFeatureScores> {
        Some(AudioFeatureScores {
            energy: Some(0.8),
            danceability: Some(0.5),
            valence: Some(0.9),
        })
    }
}

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// How many times the mock analyzer was asked to classify a mood
    pub analyzer_calls: Arc<AtomicUsize>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_inner(false).await
    }

    /// Spawns a server whose analyzer always fails with a rate limit error
    pub async fn spawn_with_failing_analyzer() -> Self {
        Self::spawn_inner(true).await
    }

    async fn spawn_inner(failing_analyzer: bool) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");

        let mood_cache = Arc::new(
            SqliteMoodCacheStore::new(temp_db_dir.path().join("mood_cache.db"))
                .expect("Failed to open mood cache"),
        );
        let suggestions: Arc<dyn SuggestionStore> = Arc::new(
            SqliteSuggestionStore::new(temp_db_dir.path().join("suggestions.db"))
                .expect("Failed to open suggestion store"),
        );

        let analyzer_calls = Arc::new(AtomicUsize::new(0));
        let analyzer: Arc<dyn SentimentAnalyzer> = Arc::new(MockAnalyzer {
            calls: analyzer_calls.clone(),
            fail: failing_analyzer,
        });
        let catalog: Arc<dyn MusicCatalog> = Arc::new(MockCatalog);

        let recommender = Arc::new(Recommender::new(
            analyzer,
            catalog,
            mood_cache.clone() as Arc<dyn MoodCacheStore>,
        ));

        let state = ServerState {
            start_time: Instant::now(),
            recommender,
            mood_cache: mood_cache as Arc<dyn MoodCacheStore>,
            suggestions,
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = make_app(state);
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            analyzer_calls,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
