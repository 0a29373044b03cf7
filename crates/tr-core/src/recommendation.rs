use serde::{Deserialize, Serialize};

/// A candidate venue surfaced to the table.
///
/// Immutable once loaded; consumed by the ranker and the voting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Unique id within the dataset (e.g. `"r2"`).
    pub id: String,
    /// Venue name.
    pub name: String,
    /// Match quality against the table's preferences, 0-100.
    pub match_score: u8,
    /// Cuisine and vibe tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Reference to a cover image.
    #[serde(default)]
    pub image: String,
    /// Price bracket indicator (e.g. `"₹₹"`).
    #[serde(default)]
    pub price_level: String,
}
