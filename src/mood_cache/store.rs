//! SQLite-backed mood cache implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::models::{CacheStats, MoodCacheEntry, TopMood};
use super::normalize::normalize_mood;
use super::schema::MOOD_CACHE_VERSIONED_SCHEMAS;
use super::trait_def::MoodCacheStore;
use crate::enrichment::EnrichedTrack;
use crate::sentiment::MoodSentiment;
use crate::sqlite_persistence::migrate_if_needed;

const TOP_MOODS_LIMIT: usize = 10;

/// SQLite-backed mood cache with separate read and write connections.
#[derive(Clone)]
pub struct SqliteMoodCacheStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteMoodCacheStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open mood cache database")?;

        migrate_if_needed(&mut write_conn, MOOD_CACHE_VERSIONED_SCHEMAS)?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on mood cache write connection")?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open mood cache database for reading")?;

        read_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on mood cache read connection")?;

        let entries: usize =
            read_conn.query_row("SELECT COUNT(*) FROM mood_cache", [], |r| r.get(0))?;
        info!("Mood cache ready: {} entries", entries);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, String, Option<String>, i64, i64, i64)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_entry(
    raw: (i64, String, String, String, Option<String>, i64, i64, i64),
) -> Result<MoodCacheEntry> {
    let (id, mood_key, sentiment_json, songs_json, contributor_id, access_count, last_accessed_at, created_at) =
        raw;
    let sentiment: MoodSentiment = serde_json::from_str(&sentiment_json)
        .with_context(|| format!("Malformed sentiment JSON in cache entry {}", id))?;
    let songs: Vec<EnrichedTrack> = serde_json::from_str(&songs_json)
        .with_context(|| format!("Malformed songs JSON in cache entry {}", id))?;
    Ok(MoodCacheEntry {
        id,
        mood_key,
        sentiment,
        songs,
        contributor_id,
        access_count,
        last_accessed_at,
        created_at,
    })
}

impl MoodCacheStore for SqliteMoodCacheStore {
    fn find_similar(
        &self,
        raw_mood: &str,
        excluding_contributor: Option<&str>,
    ) -> Result<Option<MoodCacheEntry>> {
        let mood_key = normalize_mood(raw_mood);
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, mood_key, sentiment, songs, contributor_id,
                    access_count, last_accessed_at, created_at
             FROM mood_cache
             WHERE mood_key = ?1
               AND (?2 IS NULL OR contributor_id IS NULL OR contributor_id != ?2)
             ORDER BY access_count DESC, last_accessed_at DESC
             LIMIT 1",
        )?;
        let raw = stmt
            .query_row(params![mood_key, excluding_contributor], row_to_entry)
            .optional()?;
        raw.map(parse_entry).transpose()
    }

    fn store_entry(
        &self,
        raw_mood: &str,
        sentiment: &MoodSentiment,
        songs: &[EnrichedTrack],
        contributor_id: Option<&str>,
    ) -> Result<i64> {
        let mood_key = normalize_mood(raw_mood);
        let sentiment_json = serde_json::to_string(sentiment)?;
        let songs_json = serde_json::to_string(songs)?;
        let now = chrono::Utc::now().timestamp();
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO mood_cache
             (mood_key, sentiment, songs, contributor_id, access_count, last_accessed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            params![mood_key, sentiment_json, songs_json, contributor_id, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn mark_accessed(&self, entry_id: i64) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        // Atomic in-db increment so concurrent hits never lose counts.
        conn.execute(
            "UPDATE mood_cache
             SET access_count = access_count + 1,
                 last_accessed_at = cast(strftime('%s','now') as int)
             WHERE id = ?1",
            params![entry_id],
        )?;
        Ok(())
    }

    fn sweep(&self, cutoff_epoch: i64) -> Result<usize> {
        let conn = self.write_conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM mood_cache WHERE last_accessed_at < ?1",
            params![cutoff_epoch],
        )?;
        Ok(removed)
    }

    fn stats(&self) -> Result<CacheStats> {
        let conn = self.read_conn.lock().unwrap();
        let (total_cached_moods, total_cache_hits): (usize, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(access_count), 0) FROM mood_cache",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let mut stmt = conn.prepare_cached(
            "SELECT mood_key, access_count FROM mood_cache
             ORDER BY access_count DESC LIMIT ?1",
        )?;
        let most_popular_moods = stmt
            .query_map(params![TOP_MOODS_LIMIT], |row| {
                Ok(TopMood {
                    mood: row.get(0)?,
                    access_count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let denominator = total_cache_hits + total_cached_moods as i64;
        let cache_efficiency_percent = if denominator > 0 {
            (100.0 * total_cache_hits as f64 / denominator as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Ok(CacheStats {
            total_cached_moods,
            total_cache_hits,
            cache_efficiency_percent,
            most_popular_moods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{FeatureLevel, ValenceLevel};
    use crate::sentiment::Emotion;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteMoodCacheStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("mood_cache.db");
        let store = SqliteMoodCacheStore::new(&db_path).unwrap();
        (store, tmp)
    }

    fn make_sentiment() -> MoodSentiment {
        MoodSentiment {
            score: 85,
            label: "Feeling great".to_string(),
            emotion: Emotion::Happy,
            genre: "Pop".to_string(),
        }
    }

    fn make_songs(count: usize) -> Vec<EnrichedTrack> {
        (0..count)
            .map(|i| EnrichedTrack {
                spotify_id: format!("t{}", i),
                title: format!("Song {}", i),
                artist: "Artist".to_string(),
                duration: "3:00".to_string(),
                duration_ms: Some(180_000),
                spotify_uri: format!("spotify:track:t{}", i),
                external_url: format!("https://open.spotify.com/track/t{}", i),
                image_url: Some("https://img.example/cover.jpg".to_string()),
                preview_url: None,
                album: "Album".to_string(),
                energy: FeatureLevel::High,
                danceability: FeatureLevel::Medium,
                valence: ValenceLevel::Positive,
            })
            .collect()
    }

    #[test]
    fn test_store_and_find_round_trip() {
        let (store, _tmp) = create_test_store();
        store
            .store_entry("Feeling GREAT!", &make_sentiment(), &make_songs(3), Some("u1"))
            .unwrap();

        let entry = store.find_similar("feeling great", None).unwrap().unwrap();
        assert_eq!(entry.mood_key, "feeling great");
        assert_eq!(entry.sentiment.score, 85);
        assert_eq!(entry.songs.len(), 3);
        assert_eq!(entry.contributor_id.as_deref(), Some("u1"));
        assert_eq!(entry.access_count, 1);
    }

    #[test]
    fn test_find_misses_on_unknown_mood() {
        let (store, _tmp) = create_test_store();
        assert!(store.find_similar("anything", None).unwrap().is_none());
    }

    #[test]
    fn test_contributor_exclusion() {
        let (store, _tmp) = create_test_store();
        store
            .store_entry("happy", &make_sentiment(), &make_songs(2), Some("u1"))
            .unwrap();

        // The contributor never sees their own entry.
        assert!(store.find_similar("happy", Some("u1")).unwrap().is_none());
        // Everyone else does.
        assert!(store.find_similar("happy", Some("u2")).unwrap().is_some());
        assert!(store.find_similar("happy", None).unwrap().is_some());
    }

    #[test]
    fn test_anonymous_entry_always_eligible() {
        let (store, _tmp) = create_test_store();
        store
            .store_entry("happy", &make_sentiment(), &make_songs(2), None)
            .unwrap();

        assert!(store.find_similar("happy", Some("u1")).unwrap().is_some());
        assert!(store.find_similar("happy", None).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_keys_allowed_most_popular_wins() {
        let (store, _tmp) = create_test_store();
        let first = store
            .store_entry("happy", &make_sentiment(), &make_songs(2), Some("u1"))
            .unwrap();
        let second = store
            .store_entry("HAPPY!", &make_sentiment(), &make_songs(2), Some("u2"))
            .unwrap();
        assert_ne!(first, second);

        // Bump the second entry past the first.
        store.mark_accessed(second).unwrap();
        store.mark_accessed(second).unwrap();

        let found = store.find_similar("happy", None).unwrap().unwrap();
        assert_eq!(found.id, second);
        assert_eq!(found.access_count, 3);
    }

    #[test]
    fn test_mark_accessed_is_atomic_under_concurrency() {
        let (store, _tmp) = create_test_store();
        let id = store
            .store_entry("happy", &make_sentiment(), &make_songs(1), None)
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.mark_accessed(id).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entry = store.find_similar("happy", None).unwrap().unwrap();
        assert_eq!(entry.access_count, 9);
    }

    #[test]
    fn test_sweep_removes_stale_entries() {
        let (store, _tmp) = create_test_store();
        store
            .store_entry("happy", &make_sentiment(), &make_songs(1), None)
            .unwrap();
        store
            .store_entry("sad", &make_sentiment(), &make_songs(1), None)
            .unwrap();

        let now = chrono::Utc::now().timestamp();
        // Nothing is older than an hour ago.
        assert_eq!(store.sweep(now - 3600).unwrap(), 0);
        // Everything is older than an hour from now.
        assert_eq!(store.sweep(now + 3600).unwrap(), 2);
        assert!(store.find_similar("happy", None).unwrap().is_none());
    }

    #[test]
    fn test_stats_empty_cache() {
        let (store, _tmp) = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_cached_moods, 0);
        assert_eq!(stats.total_cache_hits, 0);
        assert_eq!(stats.cache_efficiency_percent, 0.0);
        assert!(stats.most_popular_moods.is_empty());
    }

    #[test]
    fn test_stats_counts_and_efficiency() {
        let (store, _tmp) = create_test_store();
        let a = store
            .store_entry("happy", &make_sentiment(), &make_songs(1), None)
            .unwrap();
        store
            .store_entry("sad", &make_sentiment(), &make_songs(1), None)
            .unwrap();
        store.mark_accessed(a).unwrap();
        store.mark_accessed(a).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_cached_moods, 2);
        // Both entries start at 1, plus two hits on the first.
        assert_eq!(stats.total_cache_hits, 4);
        // 100 * 4 / (4 + 2) = 66.67
        assert_eq!(stats.cache_efficiency_percent, 66.67);
        assert_eq!(stats.most_popular_moods[0].mood, "happy");
        assert_eq!(stats.most_popular_moods[0].access_count, 3);
    }
}
