//! Google Books catalog client.
//!
//! A stateless request/response mapper: build the query, issue one GET,
//! decode the envelope, normalize every record. All failures collapse into
//! [`CatalogError`]; nothing here retries or caches.

use async_trait::async_trait;
use log::{debug, info, warn};

use super::normalize::book_from_volume;
use super::provider::{CatalogError, CatalogProvider, SearchResults};
use super::query::{self, VolumeQuery};
use super::types::{ErrorEnvelope, Volume, VolumesResponse};
use crate::core::book::Book;
use crate::core::intent::SearchIntent;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

pub struct GoogleBooksClient {
    base_url: String,
    result_limit: u32,
    client: reqwest::Client,
}

impl GoogleBooksClient {
    /// Creates a client with the default page size.
    ///
    /// # Arguments
    /// * `base_url` - Optional custom base URL (defaults to the public API;
    ///   tests point this at a mock server)
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_limit(base_url, query::DEFAULT_RESULT_LIMIT)
    }

    pub fn with_limit(base_url: Option<String>, result_limit: u32) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            result_limit,
            client: reqwest::Client::new(),
        }
    }

    async fn get_volumes(&self, query: &VolumeQuery) -> Result<VolumesResponse, CatalogError> {
        let response = self
            .client
            .get(format!("{}/volumes", self.base_url))
            .query(&[
                ("q", query.q.clone()),
                ("maxResults", query.max_results.to_string()),
                ("startIndex", query.start_index.to_string()),
                ("printType", "books".to_string()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        debug!("catalog response status: {}", response.status());
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        response
            .json::<VolumesResponse>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Classifies a non-success response, pulling the provider's message out of
/// its structured error body when one is present.
async fn upstream_error(response: reqwest::Response) -> CatalogError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_default();
    warn!("catalog API error: {status} - {message}");
    CatalogError::Upstream { status, message }
}

#[async_trait]
impl CatalogProvider for GoogleBooksClient {
    fn name(&self) -> &str {
        "google-books"
    }

    async fn search(&self, intent: &SearchIntent) -> Result<SearchResults, CatalogError> {
        let mut query = query::build(intent)?;
        query.max_results = self.result_limit;
        info!("catalog search: {intent} (q={})", query.q);

        let envelope = self.get_volumes(&query).await?;
        let total_count = envelope.total_items.unwrap_or(0);
        // An absent item list is an empty page, not an error.
        let books: Vec<Book> = envelope
            .items
            .unwrap_or_default()
            .into_iter()
            .map(book_from_volume)
            .collect();
        debug!("catalog search returned {} of {total_count} records", books.len());
        Ok(SearchResults { books, total_count })
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Book, CatalogError> {
        info!("catalog fetch: volume {id}");
        let response = self
            .client
            .get(format!("{}/volumes/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        let volume = response
            .json::<Volume>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(book_from_volume(volume))
    }
}
