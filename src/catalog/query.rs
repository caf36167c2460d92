//! Intent-to-query translation.
//!
//! Pure functions, no I/O. The provider's `q` parameter carries scoping
//! prefixes (`subject:`, `inauthor:`, `intitle:`); everything else is plain
//! query text passed through as typed.

use rand::Rng;

use super::provider::CatalogError;
use crate::core::intent::SearchIntent;

/// Books per page unless overridden by configuration.
pub const DEFAULT_RESULT_LIMIT: u32 = 20;

/// Broad popularity terms backing the trending feed. One is picked per
/// request; the pick is arbitrary and not required to be reproducible.
const TRENDING_TERMS: [&str; 3] = ["bestseller", "popular fiction", "award winner"];

/// Provider query parameters for one `/volumes` request.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeQuery {
    pub q: String,
    pub max_results: u32,
    pub start_index: u32,
}

impl VolumeQuery {
    fn new(q: String) -> Self {
        Self {
            q,
            max_results: DEFAULT_RESULT_LIMIT,
            start_index: 0,
        }
    }
}

/// Builds the query for an intent. Fails only on free text that is empty
/// after trimming, before any network is touched.
pub fn build(intent: &SearchIntent) -> Result<VolumeQuery, CatalogError> {
    match intent {
        SearchIntent::Trending => {
            let term = TRENDING_TERMS[rand::rng().random_range(0..TRENDING_TERMS.len())];
            Ok(VolumeQuery::new(term.to_string()))
        }
        SearchIntent::Category(category) => {
            Ok(VolumeQuery::new(format!("subject:{}", category.id())))
        }
        SearchIntent::FreeText(text) => scoped(text, ""),
    }
}

/// Author-scoped search (`inauthor:`).
pub fn by_author(author: &str) -> Result<VolumeQuery, CatalogError> {
    scoped(author, "inauthor:")
}

/// Title-scoped search (`intitle:`).
pub fn by_title(title: &str) -> Result<VolumeQuery, CatalogError> {
    scoped(title, "intitle:")
}

fn scoped(text: &str, prefix: &str) -> Result<VolumeQuery, CatalogError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation("search text is empty".to_string()));
    }
    Ok(VolumeQuery::new(format!("{prefix}{trimmed}")))
}
