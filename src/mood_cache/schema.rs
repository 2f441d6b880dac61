//! SQLite schema definitions for the mood cache database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

const MOOD_CACHE_TABLE: Table = Table {
    name: "mood_cache",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        // Normalized mood text; intentionally not unique, duplicates from
        // concurrent misses are allowed and resolved at read time.
        sqlite_column!("mood_key", &SqlType::Text, non_null = true),
        sqlite_column!("sentiment", &SqlType::Text, non_null = true), // JSON object
        sqlite_column!("songs", &SqlType::Text, non_null = true),     // JSON array
        sqlite_column!("contributor_id", &SqlType::Text),
        sqlite_column!("access_count", &SqlType::Integer, non_null = true),
        sqlite_column!("last_accessed_at", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_mood_cache_key", "mood_key")],
};

pub const MOOD_CACHE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MOOD_CACHE_TABLE],
    migration: None,
}];
