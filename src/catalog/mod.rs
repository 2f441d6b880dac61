mod spotify;
mod trait_def;
mod types;

pub use spotify::SpotifyClient;
pub use trait_def::MusicCatalog;
pub use types::{AudioFeatureScores, CatalogTrack};
