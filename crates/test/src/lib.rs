//! Test helpers and fixtures.

use nextread_catalog::Catalog;
use nextread_core::{BookRecord, Settings};

pub const SAMPLE_CSV: &str = "\
title,authors,genre,average_rating
The Hobbit,J.R.R. Tolkien,Fantasy,4.7
1984,George Orwell,Science Fiction,4.6
\"The Girl with the Dragon Tattoo\",Stieg Larsson,Mystery,4.5
Twilight,Stephenie Meyer,Fantasy,3.9
To Kill a Mockingbird,Harper Lee,Fiction,4.8
";

pub fn sample_catalog() -> Catalog {
    Catalog::from_csv(SAMPLE_CSV, &Settings::default())
        .unwrap_or_else(|err| panic!("sample catalog must load: {err}"))
}

pub fn make_record(title: &str, authors: &str, genre: &str, rating: f32) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        authors: authors.to_string(),
        genre: genre.to_string(),
        average_rating: rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_has_five_books() {
        assert_eq!(sample_catalog().len(), 5);
    }

    #[test]
    fn make_record_fills_fields() {
        let record = make_record("Dune", "Frank Herbert", "Science Fiction", 4.4);
        assert_eq!(record.title, "Dune");
        assert_eq!(record.average_rating, 4.4);
    }
}
