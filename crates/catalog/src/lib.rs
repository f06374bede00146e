//! Catalog loading and querying.
//!
//! A [`Catalog`] is read from a CSV source once at startup and is read-only
//! for the rest of the session. Loading is best-effort: malformed rows are
//! skipped and counted, and only a source that yields zero usable rows is a
//! fatal error.

use std::path::Path;

use rand::seq::SliceRandom;
use thiserror::Error;

use nextread_core::{BookId, BookRecord, SearchMode, Settings, FALLBACK_GENRE};

mod csv;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read catalog source: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog source has no header row")]
    EmptySource,
    #[error("catalog header is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("no usable rows in catalog source")]
    NoRows,
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// The in-memory book table for one process. Order is load order, or a
/// one-time shuffle of it when `Settings.shuffle_on_load` is set.
#[derive(Debug, Clone)]
pub struct Catalog {
    books: Vec<BookRecord>,
    skipped: usize,
}

struct HeaderLayout {
    title: usize,
    authors: usize,
    rating: usize,
    genre: Option<usize>,
}

impl HeaderLayout {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            title: find("title").ok_or(LoadError::MissingColumn("title"))?,
            authors: find("authors")
                .or_else(|| find("author"))
                .ok_or(LoadError::MissingColumn("authors"))?,
            rating: find("average_rating").ok_or(LoadError::MissingColumn("average_rating"))?,
            genre: find("genre"),
        })
    }

    /// Build a record from one data row, or `None` when the row is unusable:
    /// too few fields, a blank required field, or a rating that fails to
    /// parse or falls outside 0.0..=5.0.
    fn record(&self, row: &[String]) -> Option<BookRecord> {
        let title = row.get(self.title)?.trim();
        let authors = row.get(self.authors)?.trim();
        let rating = row.get(self.rating)?.trim();
        if title.is_empty() || authors.is_empty() {
            return None;
        }
        let average_rating = rating.parse::<f32>().ok()?;
        if !(0.0..=5.0).contains(&average_rating) {
            return None;
        }

        let genre = self
            .genre
            .and_then(|idx| row.get(idx))
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .unwrap_or(FALLBACK_GENRE);

        Some(BookRecord {
            title: title.to_string(),
            authors: authors.to_string(),
            genre: genre.to_string(),
            average_rating,
        })
    }
}

impl Catalog {
    /// Read and parse the catalog file. This is the only disk access the
    /// catalog ever performs.
    pub fn load(path: impl AsRef<Path>, settings: &Settings) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_csv(&text, settings)
    }

    /// Parse CSV text with a header row into a catalog.
    pub fn from_csv(text: &str, settings: &Settings) -> Result<Self> {
        let rows = csv::parse_rows(text);
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(LoadError::EmptySource)?;
        let layout = HeaderLayout::from_header(&header)?;

        let mut books = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            match layout.record(&row) {
                Some(record) => books.push(record),
                None => skipped += 1,
            }
        }

        if books.is_empty() {
            return Err(LoadError::NoRows);
        }

        if settings.shuffle_on_load {
            books.shuffle(&mut rand::thread_rng());
        }

        Ok(Self { books, skipped })
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Rows dropped during load. Informational only.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Case-insensitive substring match for title/author modes; exact match
    /// against a value from [`Catalog::genres`] for genre mode. An empty
    /// query matches nothing in every mode — the caller decides how to
    /// present "nothing searched yet".
    pub fn search(&self, mode: SearchMode, query: &str) -> Vec<&BookRecord> {
        if query.is_empty() {
            return Vec::new();
        }

        match mode {
            SearchMode::Title => {
                let needle = query.to_lowercase();
                self.books
                    .iter()
                    .filter(|b| b.title.to_lowercase().contains(&needle))
                    .collect()
            }
            SearchMode::Author => {
                let needle = query.to_lowercase();
                self.books
                    .iter()
                    .filter(|b| b.authors.to_lowercase().contains(&needle))
                    .collect()
            }
            SearchMode::Genre => self.books.iter().filter(|b| b.genre == query).collect(),
        }
    }

    /// Distinct genre values, sorted case-insensitively. This is the closed
    /// set offered for genre searches.
    pub fn genres(&self) -> Vec<String> {
        let mut out: Vec<String> = self.books.iter().map(|b| b.genre.clone()).collect();
        out.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        out.dedup();
        out
    }

    /// Top `n` records by rating, descending; ties keep catalog order.
    pub fn top_rated(&self, n: usize) -> Vec<&BookRecord> {
        let mut out: Vec<&BookRecord> = self.books.iter().collect();
        out.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        out.truncate(n);
        out
    }

    /// First record (catalog order) whose `(title, authors)` equals `id`.
    /// When several rows share an identifier the first one wins.
    pub fn find(&self, id: &BookId) -> Option<&BookRecord> {
        self.books
            .iter()
            .find(|b| b.title == id.title && b.authors == id.authors)
    }

    /// Draw `min(n, len)` distinct records uniformly without replacement.
    pub fn sample(&self, n: usize) -> Vec<&BookRecord> {
        self.sample_indices(n)
            .into_iter()
            .map(|idx| &self.books[idx])
            .collect()
    }

    /// Same draw as [`Catalog::sample`], as row indices, so a caller can pin
    /// one draw for the lifetime of a view.
    pub fn sample_indices(&self, n: usize) -> Vec<usize> {
        let indices: Vec<usize> = (0..self.books.len()).collect();
        indices
            .choose_multiple(&mut rand::thread_rng(), n)
            .copied()
            .collect()
    }
}
