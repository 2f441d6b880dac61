use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,

    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,

    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_base: String,
    pub spotify_accounts_base: String,

    /// Cache entries not accessed for this many days get swept. 0 disables
    /// the sweeper.
    pub cache_retention_days: u64,
    pub sweep_interval_hours: u64,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.db_dir.exists() {
            bail!("Database directory does not exist: {:?}", self.db_dir);
        }
        if !self.db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", self.db_dir);
        }
        if self.gemini_api_key.is_empty() {
            bail!("Gemini API key must not be empty");
        }
        if self.spotify_client_id.is_empty() || self.spotify_client_secret.is_empty() {
            bail!("Spotify client credentials must not be empty");
        }
        Ok(())
    }

    pub fn mood_cache_db_path(&self) -> PathBuf {
        self.db_dir.join("mood_cache.db")
    }

    pub fn suggestions_db_path(&self) -> PathBuf {
        self.db_dir.join("suggestions.db")
    }
}
