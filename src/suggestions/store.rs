//! SQLite-backed suggestion history implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use super::models::{SuggestedSong, SuggestionRecord};
use super::schema::SUGGESTIONS_VERSIONED_SCHEMAS;
use super::trait_def::SuggestionStore;
use crate::enrichment::format_duration;
use crate::sqlite_persistence::migrate_if_needed;

fn embed_url(spotify_id: &str) -> String {
    format!("https://open.spotify.com/embed/track/{}", spotify_id)
}

/// SQLite-backed suggestion store with separate read and write connections.
#[derive(Clone)]
pub struct SqliteSuggestionStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteSuggestionStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open suggestions database")?;

        migrate_if_needed(&mut write_conn, SUGGESTIONS_VERSIONED_SCHEMAS)?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on suggestions write connection")?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open suggestions database for reading")?;

        read_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on suggestions read connection")?;

        let saved: usize =
            read_conn.query_row("SELECT COUNT(*) FROM user_songs", [], |r| r.get(0))?;
        info!("Suggestion store ready: {} saved suggestions", saved);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }
}

impl SuggestionStore for SqliteSuggestionStore {
    fn save_suggestion(
        &self,
        user_id: &str,
        song: &SuggestedSong,
        mood: &str,
        mood_description: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.write_conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO songs
             (spotify_id, title, artist, duration_ms, image_url, preview_url, album, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                song.spotify_id,
                song.title,
                song.artist,
                song.duration_ms,
                song.image_url,
                song.preview_url,
                song.album,
                now,
            ],
        )?;
        let song_id: i64 = tx.query_row(
            "SELECT id FROM songs WHERE spotify_id = ?1",
            params![song.spotify_id],
            |r| r.get(0),
        )?;
        tx.execute(
            "INSERT INTO user_songs (user_id, song_id, mood, mood_description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, song_id, mood, mood_description, now],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn recent_suggestions(&self, user_id: &str, limit: usize) -> Result<Vec<SuggestionRecord>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT s.spotify_id, s.title, s.artist, s.duration_ms, s.image_url,
                    s.preview_url, s.album, us.mood, us.mood_description, us.created_at
             FROM user_songs us
             JOIN songs s ON s.id = us.song_id
             WHERE us.user_id = ?1
             ORDER BY us.created_at DESC, us.id DESC
             LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![user_id, limit], |row| {
                let spotify_id: String = row.get(0)?;
                let duration_ms: Option<u64> = row.get(3)?;
                let created_at: i64 = row.get(9)?;
                Ok(SuggestionRecord {
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    duration: format_duration(duration_ms),
                    image_url: row.get(4)?,
                    preview_url: row.get(5)?,
                    album: row.get(6)?,
                    embed_url: embed_url(&spotify_id),
                    mood: row.get(7)?,
                    mood_description: row.get(8)?,
                    suggested_at: chrono::DateTime::from_timestamp(created_at, 0)
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_default(),
                    spotify_id,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
