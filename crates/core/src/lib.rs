//! Core domain types for NextRead.

use serde::{Deserialize, Serialize};

/// Genre assigned when the source data carries no genre column (or a blank
/// cell). Synthesized at load time, not discovered in the data.
pub const FALLBACK_GENRE: &str = "Uncategorized";

/// One row of the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    /// Free-form; may name several authors in one string.
    pub authors: String,
    pub genre: String,
    pub average_rating: f32,
}

impl BookRecord {
    pub fn id(&self) -> BookId {
        BookId {
            title: self.title.clone(),
            authors: self.authors.clone(),
        }
    }
}

/// Bookmark identifier: the `(title, authors)` pair.
///
/// Two distinct editions sharing title and authors collide under this key;
/// lookups resolve to the first catalog row. Known limitation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookId {
    pub title: String,
    pub authors: String,
}

impl BookId {
    pub fn new(title: impl Into<String>, authors: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: authors.into(),
        }
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.title, self.authors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Title,
    Author,
    Genre,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Genre => "genre",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SearchMode::Title => SearchMode::Author,
            SearchMode::Author => SearchMode::Genre,
            SearchMode::Genre => SearchMode::Title,
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchMode {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchMode::Title),
            "author" | "authors" => Ok(SearchMode::Author),
            "genre" => Ok(SearchMode::Genre),
            _ => Err("unknown search mode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many records a "surprise me" draw returns.
    pub surprise_count: usize,
    /// How many records the top-rated view shows.
    pub top_rated_count: usize,
    /// Shuffle the catalog once at load for display variety.
    pub shuffle_on_load: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            surprise_count: 5,
            top_rated_count: 10,
            shuffle_on_load: false,
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        self.surprise_count = self.surprise_count.clamp(1, 50);
        self.top_rated_count = self.top_rated_count.clamp(1, 100);
    }
}
