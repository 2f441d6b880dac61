use async_trait::async_trait;

use super::types::MoodSentiment;

#[derive(thiserror::Error, Debug)]
pub enum ClassificationError {
    #[error("Classification provider rejected credentials")]
    Auth,
    #[error("Classification provider rate limited the request")]
    RateLimited,
    #[error("Classification request timed out")]
    Timeout,
    #[error("Could not decode classification reply: {0}")]
    Decode(String),
    #[error("Classification provider error: {0}")]
    Provider(String),
}

impl ClassificationError {
    /// Stable machine-readable tag used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassificationError::Auth => "auth",
            ClassificationError::RateLimited => "rate_limit",
            ClassificationError::Timeout => "timeout",
            ClassificationError::Decode(_) => "decode",
            ClassificationError::Provider(_) => "generic",
        }
    }
}

/// Turns a free-text mood description into a structured [`MoodSentiment`].
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn classify(&self, text: &str) -> Result<MoodSentiment, ClassificationError>;
}
