/// A track as returned by the music catalog search, before enrichment.
#[derive(Debug, Clone)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: Option<u64>,
    pub uri: String,
    pub external_url: String,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub album: String,
}

/// Raw audio feature scores from the catalog, each nominally in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct AudioFeatureScores {
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
}
