//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::catalog::{CatalogError, CatalogProvider, SearchResults};
use crate::core::book::{Book, UNKNOWN_AUTHOR};
use crate::core::intent::SearchIntent;

/// Stable lookup key for scripting stub responses per intent.
pub fn intent_key(intent: &SearchIntent) -> String {
    intent.to_string()
}

/// A minimal book fixture.
pub fn test_book(id: &str) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {id}"),
        authors: vec![UNKNOWN_AUTHOR.to_string()],
        published_date: None,
        description: None,
        cover_image: None,
        thumbnail: None,
        average_rating: None,
        ratings_count: None,
        page_count: None,
        categories: None,
        language: None,
        isbn: None,
        publisher: None,
    }
}

/// Results made of one fixture book per id, with a matching total.
pub fn results_of(ids: &[&str]) -> SearchResults {
    SearchResults {
        books: ids.iter().map(|id| test_book(id)).collect(),
        total_count: ids.len() as u64,
    }
}

/// Scriptable in-memory catalog for controller tests.
///
/// Responses are keyed by [`intent_key`]; unknown search intents resolve to
/// empty results and unknown detail ids to `NotFound`. A gate, when set for
/// a key, parks that request until the test releases it, so tests can order
/// completions deterministically without real time.
#[derive(Default)]
pub struct StubCatalog {
    responses: Mutex<HashMap<String, Result<SearchResults, CatalogError>>>,
    detail_responses: Mutex<HashMap<String, Result<Book, CatalogError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<SearchIntent>>,
}

impl StubCatalog {
    pub fn respond(&self, key: &str, response: Result<SearchResults, CatalogError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), response);
    }

    pub fn respond_detail(&self, id: &str, response: Result<Book, CatalogError>) {
        self.detail_responses
            .lock()
            .unwrap()
            .insert(id.to_string(), response);
    }

    /// Installs a gate for `key` and returns the handle the test uses to
    /// release it.
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::clone(&gate));
        gate
    }

    /// Every search intent seen so far, in call order.
    pub fn calls(&self) -> Vec<SearchIntent> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogProvider for StubCatalog {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(&self, intent: &SearchIntent) -> Result<SearchResults, CatalogError> {
        let key = intent_key(intent);
        self.calls.lock().unwrap().push(intent.clone());

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(SearchResults::default()))
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Book, CatalogError> {
        self.detail_responses
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or(Err(CatalogError::NotFound))
    }
}
