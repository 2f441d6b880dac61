//! Common types for mood sentiment classification.

use serde::{Deserialize, Serialize};

/// The closed set of emotions the classifier is allowed to produce.
///
/// The catalog search keyword table matches exhaustively on this enum, so
/// adding an emotion is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Sad,
    Energetic,
    Chill,
    Angry,
    Romantic,
}

impl Emotion {
    /// Parse an emotion word case-insensitively. Returns None for anything
    /// outside the six-value set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Some(Emotion::Happy),
            "sad" => Some(Emotion::Sad),
            "energetic" => Some(Emotion::Energetic),
            "chill" => Some(Emotion::Chill),
            "angry" => Some(Emotion::Angry),
            "romantic" => Some(Emotion::Romantic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Emotion::Happy => write!(f, "Happy"),
            Emotion::Sad => write!(f, "Sad"),
            Emotion::Energetic => write!(f, "Energetic"),
            Emotion::Chill => write!(f, "Chill"),
            Emotion::Angry => write!(f, "Angry"),
            Emotion::Romantic => write!(f, "Romantic"),
        }
    }
}

/// A validated classification of a free-text mood description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSentiment {
    /// Positivity score, always within [0, 100].
    #[serde(rename = "sentiment")]
    pub score: i64,
    /// Human-readable mood description, e.g. "Feeling great 😄".
    pub label: String,
    pub emotion: Emotion,
    /// Free-text music genre matching the mood, e.g. "Pop".
    pub genre: String,
}
