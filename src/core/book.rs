//! The internal book entity.
//!
//! One `Book` per catalog record, produced by [`crate::catalog::normalize`]
//! and immutable afterwards. Fields the remote schema marks optional stay
//! optional here; `title` and `authors` degrade to sentinels instead so
//! every book renders.

use serde::{Deserialize, Serialize};

/// Sentinel title for records without one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Sentinel author for records without any.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    /// Identifier assigned by the remote catalog; stable across requests
    /// for the same work.
    pub id: String,
    pub title: String,
    /// Source order preserved. Never empty after normalization.
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    /// Always an https URL when present.
    pub cover_image: Option<String>,
    /// Always an https URL when present.
    pub thumbnail: Option<String>,
    /// 0.0–5.0 scale as reported by the catalog.
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u32>,
    pub page_count: Option<u32>,
    pub categories: Option<Vec<String>>,
    pub language: Option<String>,
    /// First ISBN-13 the record carries, if any.
    pub isbn: Option<String>,
    pub publisher: Option<String>,
}
