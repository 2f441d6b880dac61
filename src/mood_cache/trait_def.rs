use anyhow::Result;

use super::models::{CacheStats, MoodCacheEntry};
use crate::enrichment::EnrichedTrack;
use crate::sentiment::MoodSentiment;

/// Persistent cache of mood classifications and their song lists.
pub trait MoodCacheStore: Send + Sync {
    /// Find the most popular cache entry for the normalized form of
    /// `raw_mood`, skipping entries contributed by `excluding_contributor`.
    /// Entries with no contributor are always eligible.
    fn find_similar(
        &self,
        raw_mood: &str,
        excluding_contributor: Option<&str>,
    ) -> Result<Option<MoodCacheEntry>>;

    /// Insert a new cache entry. Always inserts, even when an entry with the
    /// same key exists.
    fn store_entry(
        &self,
        raw_mood: &str,
        sentiment: &MoodSentiment,
        songs: &[EnrichedTrack],
        contributor_id: Option<&str>,
    ) -> Result<i64>;

    /// Record a cache hit: bump the access count and touch the access time.
    fn mark_accessed(&self, entry_id: i64) -> Result<()>;

    /// Delete entries last accessed before `cutoff_epoch`. Returns how many
    /// rows were removed.
    fn sweep(&self, cutoff_epoch: i64) -> Result<usize>;

    fn stats(&self) -> Result<CacheStats>;
}
