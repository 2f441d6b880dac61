mod models;
mod normalize;
mod schema;
mod store;
mod trait_def;

pub use models::{CacheStats, MoodCacheEntry, TopMood};
pub use normalize::normalize_mood;
pub use store::SqliteMoodCacheStore;
pub use trait_def::MoodCacheStore;
