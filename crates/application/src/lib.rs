//! Session state and state transitions for NextRead.
//!
//! All mutable per-user state lives in an explicit [`Session`] value and
//! changes only through [`Session::apply`], so the core is testable without
//! any rendering and several sessions can share one read-only catalog.

use nextread_catalog::Catalog;
use nextread_core::{BookId, BookRecord, SearchMode, Settings};

/// Insertion-ordered set of bookmark identifiers. Session-scoped; never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkSet {
    ids: Vec<BookId>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` when present, otherwise append it. Returns whether the id
    /// is present afterwards. This is the only mutation, so the set can never
    /// hold duplicates.
    pub fn toggle(&mut self, id: BookId) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| *existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Identifiers in insertion order.
    pub fn list(&self) -> &[BookId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Which result list the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsView {
    #[default]
    Search,
    Surprise,
    TopRated,
}

/// What a search produced. The presentation layer must render
/// `NotSearched` (no query yet) differently from `NoMatches` (a query that
/// found nothing).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    NotSearched,
    NoMatches,
    Matches(Vec<&'a BookRecord>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SetMode(SearchMode),
    QueryInput(char),
    QueryBackspace,
    SetQuery(String),
    ClearQuery,
    ToggleBookmark(BookId),
    Surprise,
    TopRated,
    BackToSearch,
}

/// One user's interaction state for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub settings: Settings,
    pub mode: SearchMode,
    pub query: String,
    pub bookmarks: BookmarkSet,
    pub view: ResultsView,
    /// Catalog row indices pinned by the last `Surprise` event; valid only
    /// while `view == ResultsView::Surprise`.
    pub surprise_picks: Vec<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    pub fn new(mut settings: Settings) -> Self {
        settings.normalize();
        Self {
            settings,
            mode: SearchMode::Title,
            query: String::new(),
            bookmarks: BookmarkSet::new(),
            view: ResultsView::Search,
            surprise_picks: Vec::new(),
        }
    }

    /// The single state-transition function: fold an event into the session.
    pub fn apply(mut self, catalog: &Catalog, event: SessionEvent) -> Session {
        match event {
            SessionEvent::SetMode(mode) => {
                if mode != self.mode {
                    self.mode = mode;
                    self.query.clear();
                }
                self.view = ResultsView::Search;
            }
            SessionEvent::QueryInput(ch) => {
                if !ch.is_control() {
                    self.query.push(ch);
                }
                self.view = ResultsView::Search;
            }
            SessionEvent::QueryBackspace => {
                self.query.pop();
                self.view = ResultsView::Search;
            }
            SessionEvent::SetQuery(query) => {
                self.query = query;
                self.view = ResultsView::Search;
            }
            SessionEvent::ClearQuery => {
                self.query.clear();
                self.view = ResultsView::Search;
            }
            SessionEvent::ToggleBookmark(id) => {
                self.bookmarks.toggle(id);
            }
            SessionEvent::Surprise => {
                self.surprise_picks = catalog.sample_indices(self.settings.surprise_count);
                self.view = ResultsView::Surprise;
            }
            SessionEvent::TopRated => {
                self.view = ResultsView::TopRated;
            }
            SessionEvent::BackToSearch => {
                self.view = ResultsView::Search;
                self.surprise_picks.clear();
            }
        }
        self
    }

    /// Result of the current search state, independent of the active view.
    pub fn outcome<'a>(&self, catalog: &'a Catalog) -> SearchOutcome<'a> {
        if self.query.is_empty() {
            return SearchOutcome::NotSearched;
        }
        let hits = catalog.search(self.mode, &self.query);
        if hits.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Matches(hits)
        }
    }

    /// Records the active view currently shows, in display order.
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a BookRecord> {
        match self.view {
            ResultsView::Search => match self.outcome(catalog) {
                SearchOutcome::Matches(hits) => hits,
                _ => Vec::new(),
            },
            ResultsView::Surprise => self
                .surprise_picks
                .iter()
                .filter_map(|idx| catalog.books().get(*idx))
                .collect(),
            ResultsView::TopRated => catalog.top_rated(self.settings.top_rated_count),
        }
    }

    /// Resolve bookmarks to records for display. An identifier shared by
    /// several rows shows the first row; a bookmark no catalog row matches is
    /// skipped.
    pub fn bookmarked_records<'a>(&self, catalog: &'a Catalog) -> Vec<&'a BookRecord> {
        self.bookmarks
            .list()
            .iter()
            .filter_map(|id| catalog.find(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextread_core::Settings;

    fn catalog() -> Catalog {
        let text = "\
title,authors,genre,average_rating
The Hobbit,J.R.R. Tolkien,Fantasy,4.7
1984,George Orwell,Science Fiction,4.6
Twilight,Stephenie Meyer,Fantasy,3.9
To Kill a Mockingbird,Harper Lee,Fiction,4.8
Dune,Frank Herbert,Science Fiction,4.4
";
        Catalog::from_csv(text, &Settings::default()).unwrap()
    }

    fn session() -> Session {
        Session::new(Settings::default())
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut store = BookmarkSet::new();
        let before = store.clone();
        let id = BookId::new("1984", "George Orwell");

        assert!(store.toggle(id.clone()));
        assert!(store.contains(&id));
        assert!(!store.toggle(id.clone()));
        assert!(!store.contains(&id));
        assert_eq!(store, before);
    }

    #[test]
    fn bookmarks_keep_insertion_order_without_duplicates() {
        let mut store = BookmarkSet::new();
        let a = BookId::new("A", "x");
        let b = BookId::new("B", "y");
        store.toggle(a.clone());
        store.toggle(b.clone());
        store.toggle(a.clone());
        store.toggle(a.clone());
        assert_eq!(store.list(), &[b.clone(), a.clone()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_query_is_not_searched_not_no_matches() {
        let catalog = catalog();
        let session = session();
        assert_eq!(session.outcome(&catalog), SearchOutcome::NotSearched);

        let session = session.apply(&catalog, SessionEvent::SetQuery("zzzz".to_string()));
        assert_eq!(session.outcome(&catalog), SearchOutcome::NoMatches);
    }

    #[test]
    fn typed_query_finds_matches() {
        let catalog = catalog();
        let mut session = session();
        for ch in "1984".chars() {
            session = session.apply(&catalog, SessionEvent::QueryInput(ch));
        }
        match session.outcome(&catalog) {
            SearchOutcome::Matches(hits) => {
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].authors, "George Orwell");
            }
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn changing_mode_clears_the_query() {
        let catalog = catalog();
        let session = session().apply(&catalog, SessionEvent::SetQuery("orwell".to_string()));
        let session = session.apply(&catalog, SessionEvent::SetMode(SearchMode::Author));
        assert!(session.query.is_empty());
        assert_eq!(session.mode, SearchMode::Author);

        // Re-selecting the active mode keeps the query.
        let session = session.apply(&catalog, SessionEvent::SetQuery("orwell".to_string()));
        let session = session.apply(&catalog, SessionEvent::SetMode(SearchMode::Author));
        assert_eq!(session.query, "orwell");
    }

    #[test]
    fn surprise_pins_distinct_in_bounds_picks() {
        let catalog = catalog();
        let session = session().apply(&catalog, SessionEvent::Surprise);
        assert_eq!(session.view, ResultsView::Surprise);
        assert_eq!(session.surprise_picks.len(), 5);

        let mut picks = session.surprise_picks.clone();
        picks.sort_unstable();
        picks.dedup();
        assert_eq!(picks.len(), 5);
        assert!(picks.iter().all(|idx| *idx < catalog.len()));

        let visible = session.visible(&catalog);
        assert_eq!(visible.len(), 5);
    }

    #[test]
    fn back_to_search_drops_surprise_picks() {
        let catalog = catalog();
        let session = session().apply(&catalog, SessionEvent::Surprise);
        let session = session.apply(&catalog, SessionEvent::BackToSearch);
        assert_eq!(session.view, ResultsView::Search);
        assert!(session.surprise_picks.is_empty());
    }

    #[test]
    fn top_rated_view_is_sorted_and_capped() {
        let catalog = catalog();
        let settings = Settings {
            top_rated_count: 3,
            ..Settings::default()
        };
        let session = Session::new(settings).apply(&catalog, SessionEvent::TopRated);
        let visible = session.visible(&catalog);
        let titles: Vec<&str> = visible.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["To Kill a Mockingbird", "The Hobbit", "1984"]);
    }

    #[test]
    fn bookmarked_records_resolve_in_insertion_order() {
        let catalog = catalog();
        let mut session = session();
        session = session.apply(
            &catalog,
            SessionEvent::ToggleBookmark(BookId::new("Dune", "Frank Herbert")),
        );
        session = session.apply(
            &catalog,
            SessionEvent::ToggleBookmark(BookId::new("1984", "George Orwell")),
        );
        // A stale bookmark with no catalog row is skipped on display.
        session = session.apply(
            &catalog,
            SessionEvent::ToggleBookmark(BookId::new("Ghost", "Nobody")),
        );

        let titles: Vec<&str> = session
            .bookmarked_records(&catalog)
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Dune", "1984"]);
    }

    #[test]
    fn sessions_are_isolated_over_a_shared_catalog() {
        let catalog = catalog();
        let a = session().apply(
            &catalog,
            SessionEvent::ToggleBookmark(BookId::new("Dune", "Frank Herbert")),
        );
        let b = session();
        assert_eq!(a.bookmarks.len(), 1);
        assert!(b.bookmarks.is_empty());
    }

    #[test]
    fn control_characters_do_not_enter_the_query() {
        let catalog = catalog();
        let session = session().apply(&catalog, SessionEvent::QueryInput('\u{8}'));
        assert!(session.query.is_empty());
    }
}
