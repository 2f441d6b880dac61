use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodtune_server::catalog::{MusicCatalog, SpotifyClient};
use moodtune_server::config::{
    AppConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_SPOTIFY_ACCOUNTS_BASE,
    DEFAULT_SPOTIFY_API_BASE,
};
use moodtune_server::mood_cache::{MoodCacheStore, SqliteMoodCacheStore};
use moodtune_server::recommend::Recommender;
use moodtune_server::sentiment::{GeminiClient, SentimentAnalyzer};
use moodtune_server::server::state::ServerState;
use moodtune_server::server::run_server;
use moodtune_server::suggestions::{SqliteSuggestionStore, SuggestionStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite database files.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Gemini API key used for mood classification.
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Base URL of the Gemini API.
    #[clap(long, default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Gemini model name.
    #[clap(long, default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Spotify client id for the client-credentials flow.
    #[clap(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: String,

    /// Spotify client secret for the client-credentials flow.
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: String,

    /// Base URL of the Spotify Web API.
    #[clap(long, default_value = DEFAULT_SPOTIFY_API_BASE)]
    pub spotify_api_base: String,

    /// Base URL of the Spotify accounts service.
    #[clap(long, default_value = DEFAULT_SPOTIFY_ACCOUNTS_BASE)]
    pub spotify_accounts_base: String,

    /// Days to retain unaccessed cache entries. Set to 0 to disable sweeping.
    #[clap(long, default_value_t = 30)]
    pub cache_retention_days: u64,

    /// Interval in hours between cache sweeps. Only used if cache_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub sweep_interval_hours: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let config = AppConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        gemini_api_key: cli_args.gemini_api_key,
        gemini_base_url: cli_args.gemini_base_url,
        gemini_model: cli_args.gemini_model,
        spotify_client_id: cli_args.spotify_client_id,
        spotify_client_secret: cli_args.spotify_client_secret,
        spotify_api_base: cli_args.spotify_api_base,
        spotify_accounts_base: cli_args.spotify_accounts_base,
        cache_retention_days: cli_args.cache_retention_days,
        sweep_interval_hours: cli_args.sweep_interval_hours,
    };
    config.validate()?;

    info!("Opening mood cache at {:?}...", config.mood_cache_db_path());
    let mood_cache = Arc::new(SqliteMoodCacheStore::new(config.mood_cache_db_path())?);

    info!(
        "Opening suggestion store at {:?}...",
        config.suggestions_db_path()
    );
    let suggestions: Arc<dyn SuggestionStore> =
        Arc::new(SqliteSuggestionStore::new(config.suggestions_db_path())?);

    let analyzer: Arc<dyn SentimentAnalyzer> = Arc::new(GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
    ));
    let catalog: Arc<dyn MusicCatalog> = Arc::new(SpotifyClient::new(
        config.spotify_api_base.clone(),
        config.spotify_accounts_base.clone(),
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    ));

    let recommender = Arc::new(Recommender::new(
        analyzer,
        catalog,
        mood_cache.clone() as Arc<dyn MoodCacheStore>,
    ));

    // Spawn background task for cache sweeping if enabled
    if config.cache_retention_days > 0 {
        let retention_days = config.cache_retention_days;
        let interval_hours = config.sweep_interval_hours;
        let sweeping_cache = mood_cache.clone();

        info!(
            "Cache sweeping enabled: retaining {} days, sweeping every {} hours",
            retention_days, interval_hours
        );

        tokio::spawn(async move {
            let interval = Duration::from_secs(interval_hours * 60 * 60);
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let cutoff = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0)
                    - (retention_days as i64 * 24 * 60 * 60);

                match sweeping_cache.sweep(cutoff) {
                    Ok(count) => {
                        if count > 0 {
                            info!("Swept {} stale mood cache entries", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to sweep mood cache: {}", e);
                    }
                }
            }
        });
    }

    let state = ServerState {
        start_time: Instant::now(),
        recommender,
        mood_cache: mood_cache as Arc<dyn MoodCacheStore>,
        suggestions,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(config.port, state).await
}
