//! Catalog record normalization.
//!
//! Exactly one [`Book`] per external record, never an error: any missing or
//! malformed field degrades to a documented default instead. The mapping is
//! idempotent: the same record always yields the same book.

use super::types::{IndustryIdentifier, Volume};
use crate::core::book::{Book, UNKNOWN_AUTHOR, UNKNOWN_TITLE};

/// Maps one external record to the internal entity.
pub fn book_from_volume(volume: Volume) -> Book {
    let info = volume.volume_info;

    let (cover_image, thumbnail) = match info.image_links {
        Some(links) => (
            links.thumbnail.map(secure_url),
            links.small_thumbnail.map(secure_url),
        ),
        None => (None, None),
    };

    Book {
        id: volume.id,
        title: info
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        authors: match info.authors {
            Some(authors) if !authors.is_empty() => authors,
            _ => vec![UNKNOWN_AUTHOR.to_string()],
        },
        published_date: info.published_date,
        description: info.description,
        cover_image,
        thumbnail,
        average_rating: info.average_rating,
        ratings_count: info.ratings_count,
        page_count: info.page_count,
        categories: info.categories,
        language: info.language,
        isbn: info.industry_identifiers.as_deref().and_then(first_isbn_13),
        publisher: info.publisher,
    }
}

/// Upgrades an insecure URL; https and other schemes pass through untouched.
fn secure_url(url: String) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url,
    }
}

fn first_isbn_13(identifiers: &[IndustryIdentifier]) -> Option<String> {
    identifiers
        .iter()
        .find(|identifier| identifier.kind == "ISBN_13")
        .map(|identifier| identifier.identifier.clone())
}
