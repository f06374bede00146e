//! End-to-end scenarios over the whole load/search/bookmark/sample flow.

use nextread_application::{ResultsView, SearchOutcome, Session, SessionEvent};
use nextread_catalog::{Catalog, LoadError};
use nextread_core::{BookId, SearchMode, Settings};
use nextread_test::{sample_catalog, SAMPLE_CSV};

#[test]
fn title_search_finds_1984_and_misses_xyz() {
    let catalog = Catalog::from_csv(
        "title,authors,average_rating\n1984,George Orwell,4.6\n",
        &Settings::default(),
    )
    .unwrap();

    let hits = catalog.search(SearchMode::Title, "1984");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "1984");
    assert_eq!(hits[0].authors, "George Orwell");

    assert!(catalog.search(SearchMode::Title, "xyz").is_empty());
}

#[test]
fn bookmark_toggle_round_trip() {
    let catalog = sample_catalog();
    let id = BookId::new("1984", "George Orwell");

    let session = Session::new(Settings::default());
    let session = session.apply(&catalog, SessionEvent::ToggleBookmark(id.clone()));
    assert_eq!(session.bookmarks.list(), &[id.clone()]);
    assert_eq!(id.to_string(), "1984|George Orwell");

    let session = session.apply(&catalog, SessionEvent::ToggleBookmark(id.clone()));
    assert!(session.bookmarks.list().is_empty());
}

#[test]
fn sampling_more_than_the_catalog_returns_everything() {
    let catalog = sample_catalog();
    assert_eq!(catalog.len(), 5);

    let picks = catalog.sample(10);
    assert_eq!(picks.len(), 5);

    let mut ids: Vec<String> = picks.iter().map(|b| b.id().to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn malformed_rows_are_dropped_well_formed_rows_survive() {
    let mut text = String::from(SAMPLE_CSV);
    text.push_str(",missing title,Horror,3.0\n");
    text.push_str("Broken Rating,Someone,Horror,high\n");

    let catalog = Catalog::from_csv(&text, &Settings::default()).unwrap();
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.skipped(), 2);
}

#[test]
fn missing_source_file_is_a_fatal_load_error() {
    let err = Catalog::load("does/not/exist.csv", &Settings::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn full_session_flow_search_bookmark_surprise() {
    let catalog = sample_catalog();
    let mut session = Session::new(Settings::default());

    // Nothing searched yet.
    assert_eq!(session.outcome(&catalog), SearchOutcome::NotSearched);

    // Author search for Orwell.
    session = session.apply(&catalog, SessionEvent::SetMode(SearchMode::Author));
    for ch in "orwell".chars() {
        session = session.apply(&catalog, SessionEvent::QueryInput(ch));
    }
    let hits = match session.outcome(&catalog) {
        SearchOutcome::Matches(hits) => hits,
        other => panic!("expected matches, got {other:?}"),
    };
    assert_eq!(hits.len(), 1);

    // Bookmark the hit.
    let id = hits[0].id();
    session = session.apply(&catalog, SessionEvent::ToggleBookmark(id.clone()));
    assert!(session.bookmarks.contains(&id));

    // Surprise view pins picks; the bookmark survives the detour.
    session = session.apply(&catalog, SessionEvent::Surprise);
    assert_eq!(session.view, ResultsView::Surprise);
    assert_eq!(session.visible(&catalog).len(), 5);

    session = session.apply(&catalog, SessionEvent::BackToSearch);
    assert!(session.bookmarks.contains(&id));
    assert_eq!(session.query, "orwell");
}

#[test]
fn genre_browse_uses_catalog_enumeration() {
    let catalog = sample_catalog();
    let genres = catalog.genres();
    assert_eq!(genres, vec!["Fantasy", "Fiction", "Mystery", "Science Fiction"]);

    let session = Session::new(Settings::default())
        .apply(&catalog, SessionEvent::SetMode(SearchMode::Genre))
        .apply(&catalog, SessionEvent::SetQuery(genres[0].clone()));
    let visible = session.visible(&catalog);
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|b| b.genre == "Fantasy"));
}

#[test]
fn colliding_identifiers_resolve_to_the_first_row() {
    let text = "\
title,authors,genre,average_rating
1984,George Orwell,Science Fiction,4.6
1984,George Orwell,Dystopia,4.1
";
    let catalog = Catalog::from_csv(text, &Settings::default()).unwrap();
    let session = Session::new(Settings::default()).apply(
        &catalog,
        SessionEvent::ToggleBookmark(BookId::new("1984", "George Orwell")),
    );
    let records = session.bookmarked_records(&catalog);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].genre, "Science Fiction");
}
