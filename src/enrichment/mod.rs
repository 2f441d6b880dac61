//! Maps raw catalog audio features onto categorical labels and assembles
//! the song objects returned to clients.

use serde::{Deserialize, Serialize};

use crate::catalog::{AudioFeatureScores, CatalogTrack};

const LOW_CUTOFF: f64 = 0.33;
const HIGH_CUTOFF: f64 = 0.67;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValenceLevel {
    Negative,
    Neutral,
    Positive,
}

/// Bucket a [0, 1] score into low / medium / high. A missing score maps
/// to the middle bucket.
pub fn feature_level(score: Option<f64>) -> FeatureLevel {
    match score {
        Some(s) if s < LOW_CUTOFF => FeatureLevel::Low,
        Some(s) if s < HIGH_CUTOFF => FeatureLevel::Medium,
        Some(_) => FeatureLevel::High,
        None => FeatureLevel::Medium,
    }
}

pub fn valence_level(score: Option<f64>) -> ValenceLevel {
    match score {
        Some(s) if s < LOW_CUTOFF => ValenceLevel::Negative,
        Some(s) if s < HIGH_CUTOFF => ValenceLevel::Neutral,
        Some(_) => ValenceLevel::Positive,
        None => ValenceLevel::Neutral,
    }
}

/// Format a track duration as "m:ss". Missing durations render as "0:00".
pub fn format_duration(duration_ms: Option<u64>) -> String {
    let total_seconds = duration_ms.unwrap_or(0) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// A catalog track with its audio features bucketed into labels, ready to
/// be cached and returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTrack {
    pub spotify_id: String,
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub duration_ms: Option<u64>,
    pub spotify_uri: String,
    pub external_url: String,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub album: String,
    pub energy: FeatureLevel,
    pub danceability: FeatureLevel,
    pub valence: ValenceLevel,
}

/// Combine a track with its (possibly missing) audio features. A track the
/// catalog returned no features for still gets middle-bucket labels.
pub fn enrich_track(track: CatalogTrack, features: Option<AudioFeatureScores>) -> EnrichedTrack {
    let features = features.unwrap_or(AudioFeatureScores {
        energy: None,
        danceability: None,
        valence: None,
    });
    EnrichedTrack {
        duration: format_duration(track.duration_ms),
        spotify_id: track.id,
        title: track.title,
        artist: track.artist,
        duration_ms: track.duration_ms,
        spotify_uri: track.uri,
        external_url: track.external_url,
        image_url: track.image_url,
        preview_url: track.preview_url,
        album: track.album,
        energy: feature_level(features.energy),
        danceability: feature_level(features.danceability),
        valence: valence_level(features.valence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_level_boundaries() {
        assert_eq!(feature_level(Some(0.0)), FeatureLevel::Low);
        assert_eq!(feature_level(Some(0.32)), FeatureLevel::Low);
        assert_eq!(feature_level(Some(0.33)), FeatureLevel::Medium);
        assert_eq!(feature_level(Some(0.66)), FeatureLevel::Medium);
        assert_eq!(feature_level(Some(0.67)), FeatureLevel::High);
        assert_eq!(feature_level(Some(1.0)), FeatureLevel::High);
    }

    #[test]
    fn test_missing_feature_is_medium() {
        assert_eq!(feature_level(None), FeatureLevel::Medium);
        assert_eq!(valence_level(None), ValenceLevel::Neutral);
    }

    #[test]
    fn test_valence_level_boundaries() {
        assert_eq!(valence_level(Some(0.1)), ValenceLevel::Negative);
        assert_eq!(valence_level(Some(0.5)), ValenceLevel::Neutral);
        assert_eq!(valence_level(Some(0.9)), ValenceLevel::Positive);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(215_000)), "3:35");
        assert_eq!(format_duration(Some(59_999)), "0:59");
        assert_eq!(format_duration(Some(60_000)), "1:00");
        assert_eq!(format_duration(None), "0:00");
    }

    #[test]
    fn test_enrich_track_without_features() {
        let track = CatalogTrack {
            id: "abc".to_string(),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            duration_ms: Some(180_000),
            uri: "spotify:track:abc".to_string(),
            external_url: "https://open.spotify.com/track/abc".to_string(),
            image_url: None,
            preview_url: None,
            album: "Album".to_string(),
        };
        let enriched = enrich_track(track, None);
        assert_eq!(enriched.duration, "3:00");
        assert_eq!(enriched.energy, FeatureLevel::Medium);
        assert_eq!(enriched.danceability, FeatureLevel::Medium);
        assert_eq!(enriched.valence, ValenceLevel::Neutral);
    }

    #[test]
    fn test_levels_serialize_lowercase() {
        assert_eq!(
            serde_json::to_value(FeatureLevel::High).unwrap(),
            serde_json::json!("high")
        );
        assert_eq!(
            serde_json::to_value(ValenceLevel::Negative).unwrap(),
            serde_json::json!("negative")
        );
    }
}
