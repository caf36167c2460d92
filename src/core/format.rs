//! Display helpers for book fields.
//!
//! Pure string shaping for presentation surfaces; the entity itself stays
//! untouched.

use crate::core::book::UNKNOWN_AUTHOR;

/// Publication year from a catalog date string ("2005-11-15" → "2005").
pub fn format_date(date: Option<&str>) -> String {
    match date
        .and_then(|d| d.get(..4))
        .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    {
        Some(year) => year.to_string(),
        None => "Unknown".to_string(),
    }
}

/// Compact author list: "A", "A & B", or "A and N others".
pub fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [one] => one.clone(),
        [a, b] => format!("{a} & {b}"),
        [first, rest @ ..] => format!("{first} and {} others", rest.len()),
    }
}

/// One-decimal rating, "N/A" when absent or zero.
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(rating) if rating > 0.0 => format!("{rating:.1}"),
        _ => "N/A".to_string(),
    }
}

pub fn format_page_count(pages: Option<u32>) -> String {
    match pages {
        Some(pages) if pages > 0 => format!("{pages} pages"),
        _ => "Unknown".to_string(),
    }
}

/// Truncates to at most `max_chars` characters, appending "..." and
/// trimming trailing whitespace at the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Hyphenates an ISBN-13 (978-0-4410-1359-3 style); anything else passes
/// through, absent becomes "N/A".
pub fn format_isbn(isbn: Option<&str>) -> String {
    match isbn {
        Some(raw) if raw.len() == 13 && raw.is_ascii() => format!(
            "{}-{}-{}-{}-{}",
            &raw[..3],
            &raw[3..4],
            &raw[4..8],
            &raw[8..12],
            &raw[12..]
        ),
        Some(raw) => raw.to_string(),
        None => "N/A".to_string(),
    }
}
