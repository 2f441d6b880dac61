mod analyzer;
mod gemini;
mod types;

pub use analyzer::{ClassificationError, SentimentAnalyzer};
pub use gemini::GeminiClient;
pub use types::{Emotion, MoodSentiment};
