mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{SuggestedSong, SuggestionRecord};
pub use store::SqliteSuggestionStore;
pub use trait_def::SuggestionStore;
