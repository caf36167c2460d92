//! # Search Orchestration
//!
//! The stateful core. Exactly one intent is authoritative at a time; every
//! new intent bumps a generation counter, aborts the single scheduled-task
//! slot, and (except for sub-threshold free text) spawns a replacement task
//! that optionally sleeps a debounce window, publishes `Loading`, and runs
//! the request. A completion applies its outcome only while its captured
//! generation is still current, so the last request wins regardless of
//! arrival order, even when the transport finishes after an abort was
//! requested.
//!
//! ```text
//!   submit / select / refresh / clear
//!           │  arm(): generation += 1, abort previous slot
//!           ▼
//!   ┌─ scheduled task ──────────────────────────────┐
//!   │ sleep(debounce)?  →  Loading  →  search(...)  │  ← Abortable
//!   └───────────────┬───────────────────────────────┘
//!                   ▼
//!   apply_outcome(): generation still current?
//!        yes → Ready / Errored     no or Cancelled → discarded
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time;

use crate::catalog::{CatalogError, CatalogProvider, SearchResults};
use crate::core::book::Book;
use crate::core::intent::{Category, SearchIntent};

/// Delay between the last keystroke and the request it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Trimmed free-text inputs at or below this length never search.
pub const SHORT_QUERY_MAX: usize = 2;

/// Where the controller currently is. One tagged value instead of separate
/// loading/error flags, so loading-and-errored is unrepresentable.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum SearchPhase {
    /// No query and no category; nothing requested yet.
    #[default]
    Idle,
    /// A request for the current intent is in flight.
    Loading,
    /// The last completed outcome for the current intent was results.
    Ready,
    /// The last completed outcome was a failure; carries the user message.
    Errored(String),
}

/// The observable state consumed by the presentation layer.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SearchSnapshot {
    pub phase: SearchPhase,
    /// Provider relevance order, retained through a refresh.
    pub books: Vec<Book>,
    pub total_count: u64,
    /// The selected category chip, if the current intent is a category.
    pub category: Option<Category>,
}

impl SearchSnapshot {
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            SearchPhase::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }
}

/// The single scheduled-task slot plus the intent it belongs to.
struct Slot {
    intent: Option<SearchIntent>,
    generation: u64,
    abort: Option<AbortHandle>,
}

struct Shared {
    slot: Mutex<Slot>,
    snapshot: watch::Sender<SearchSnapshot>,
}

pub struct SearchController {
    catalog: Arc<dyn CatalogProvider>,
    shared: Arc<Shared>,
    debounce: Duration,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::with_debounce(catalog, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(catalog: Arc<dyn CatalogProvider>, debounce: Duration) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());
        Self {
            catalog,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    intent: None,
                    generation: 0,
                    abort: None,
                }),
                snapshot,
            }),
            debounce,
        }
    }

    /// Subscribes to state changes. Every published snapshot is complete;
    /// observers that only care about the latest value can just borrow.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Free-text keystroke. Empty input clears back to the trending feed;
    /// anything else schedules a debounced request, superseding whatever was
    /// in flight. Inputs of one or two characters supersede but never search.
    pub fn submit_free_text(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("free text cleared, resetting to trending");
            self.clear();
            return;
        }

        let intent = SearchIntent::FreeText(trimmed.to_string());
        if trimmed.chars().count() <= SHORT_QUERY_MAX {
            debug!("query {trimmed:?} below search threshold");
            self.arm(Some(intent));
            return;
        }

        let (generation, registration) = self.arm(Some(intent.clone()));
        self.spawn_request(intent, generation, registration, Some(self.debounce));
    }

    /// Category pick. Fires immediately, no debounce.
    pub fn select_category(&self, category: Category) {
        info!("category selected: {}", category.id());
        let intent = SearchIntent::Category(category);
        let (generation, registration) = self.arm(Some(intent.clone()));
        self.spawn_request(intent, generation, registration, None);
    }

    /// Loads the trending feed. Invoked once at startup and whenever free
    /// text is cleared.
    pub fn load_trending(&self) {
        info!("loading trending books");
        let (generation, registration) = self.arm(Some(SearchIntent::Trending));
        self.spawn_request(SearchIntent::Trending, generation, registration, None);
    }

    /// Re-issues the request for the current intent (trending when there is
    /// none). Displayed results stay up until the new outcome lands.
    pub fn refresh(&self) {
        let current = self.shared.slot.lock().unwrap().intent.clone();
        let intent = match current {
            Some(SearchIntent::FreeText(text)) if !text.trim().is_empty() => {
                SearchIntent::FreeText(text)
            }
            Some(SearchIntent::Category(category)) => SearchIntent::Category(category),
            _ => SearchIntent::Trending,
        };
        info!("refreshing {intent}");
        let (generation, registration) = self.arm(Some(intent.clone()));
        self.spawn_request(intent, generation, registration, None);
    }

    /// Drops the current intent and results, then reloads trending.
    pub fn clear(&self) {
        self.arm(None);
        self.shared.snapshot.send_modify(|snapshot| {
            snapshot.phase = SearchPhase::Idle;
            snapshot.books.clear();
            snapshot.total_count = 0;
            snapshot.category = None;
        });
        self.load_trending();
    }

    /// Single-record fetch for a detail view. Independent of search state;
    /// failures come back as ready-to-display messages.
    pub async fn get_by_id(&self, id: &str) -> Result<Book, String> {
        self.catalog
            .fetch_by_id(id)
            .await
            .map_err(|err| detail_failure_message(&err))
    }

    /// Supersedes the current slot under one lock hold: bumps the
    /// generation, aborts the old task, installs a fresh abort handle, and
    /// records the new intent. Callers that schedule nothing just drop the
    /// returned registration.
    fn arm(&self, intent: Option<SearchIntent>) -> (u64, AbortRegistration) {
        let (abort, registration) = AbortHandle::new_pair();
        let mut slot = self.shared.slot.lock().unwrap();
        if let Some(previous) = slot.abort.take() {
            debug!("aborting request slot for generation {}", slot.generation);
            previous.abort();
        }
        slot.generation += 1;
        slot.intent = intent;
        slot.abort = Some(abort);
        (slot.generation, registration)
    }

    fn spawn_request(
        &self,
        intent: SearchIntent,
        generation: u64,
        registration: AbortRegistration,
        delay: Option<Duration>,
    ) {
        let catalog = Arc::clone(&self.catalog);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let attempt = Abortable::new(
                run_search(catalog, Arc::clone(&shared), intent, generation, delay),
                registration,
            );
            let outcome = match attempt.await {
                Ok(outcome) => outcome,
                Err(Aborted) => Err(CatalogError::Cancelled),
            };
            apply_outcome(&shared, generation, outcome);
        });
    }
}

/// The body of one scheduled attempt: optional debounce sleep, a staleness
/// check, the `Loading` publish, then the request itself.
async fn run_search(
    catalog: Arc<dyn CatalogProvider>,
    shared: Arc<Shared>,
    intent: SearchIntent,
    generation: u64,
    delay: Option<Duration>,
) -> Result<SearchResults, CatalogError> {
    if let Some(delay) = delay {
        time::sleep(delay).await;
    }
    {
        let slot = shared.slot.lock().unwrap();
        if slot.generation != generation {
            return Err(CatalogError::Cancelled);
        }
        let category = match &intent {
            SearchIntent::Category(category) => Some(*category),
            _ => None,
        };
        shared.snapshot.send_modify(|snapshot| {
            // Results on screen stay up while the new request runs.
            snapshot.phase = SearchPhase::Loading;
            snapshot.category = category;
        });
    }
    catalog.search(&intent).await
}

/// Applies an outcome if its generation is still the current one. Stale and
/// cancelled outcomes are discarded without touching visible state.
fn apply_outcome(
    shared: &Shared,
    generation: u64,
    outcome: Result<SearchResults, CatalogError>,
) {
    let slot = shared.slot.lock().unwrap();
    if slot.generation != generation {
        debug!("discarding outcome for superseded generation {generation}");
        return;
    }
    match outcome {
        Ok(results) => {
            info!(
                "search ready: {} books (total {})",
                results.books.len(),
                results.total_count
            );
            shared.snapshot.send_modify(|snapshot| {
                snapshot.phase = SearchPhase::Ready;
                snapshot.books = results.books;
                snapshot.total_count = results.total_count;
            });
        }
        Err(CatalogError::Cancelled) => {
            debug!("cancelled request for generation {generation} absorbed");
        }
        Err(err) => {
            warn!("search failed: {err}");
            shared.snapshot.send_modify(|snapshot| {
                snapshot.phase = SearchPhase::Errored(search_failure_message(&err));
                snapshot.books.clear();
                snapshot.total_count = 0;
            });
        }
    }
}

fn search_failure_message(err: &CatalogError) -> String {
    match err {
        CatalogError::Upstream { message, .. } if !message.is_empty() => message.clone(),
        _ => "Failed to search books. Please try again.".to_string(),
    }
}

fn detail_failure_message(err: &CatalogError) -> String {
    match err {
        CatalogError::NotFound => "Book not found".to_string(),
        CatalogError::Upstream { message, .. } if !message.is_empty() => message.clone(),
        _ => "Failed to fetch book details".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{intent_key, results_of, test_book, StubCatalog};

    /// Awaits snapshot changes until `pred` holds, bounded by a generous
    /// timeout so a broken transition fails the test instead of hanging.
    async fn wait_for(
        rx: &mut watch::Receiver<SearchSnapshot>,
        pred: impl Fn(&SearchSnapshot) -> bool,
    ) -> SearchSnapshot {
        time::timeout(Duration::from_secs(30), async {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if pred(&snapshot) {
                        return snapshot.clone();
                    }
                }
                rx.changed().await.expect("controller dropped");
            }
        })
        .await
        .expect("snapshot never matched")
    }

    fn controller_with(stub: Arc<StubCatalog>) -> SearchController {
        SearchController::new(stub)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_coalesces_into_one_request() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("text:dune", Ok(results_of(&["d1"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.submit_free_text("dun");
        controller.submit_free_text("dune");

        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(snapshot.books.len(), 1);
        assert_eq!(
            stub.calls(),
            vec![SearchIntent::FreeText("dune".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_searches() {
        let stub = Arc::new(StubCatalog::default());
        let controller = controller_with(Arc::clone(&stub));

        controller.submit_free_text("ab");
        time::sleep(Duration::from_secs(2)).await;

        assert!(stub.calls().is_empty());
        assert_eq!(controller.snapshot().phase, SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submission_resets_to_idle_then_trending() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("trending", Ok(results_of(&["t1", "t2"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.submit_free_text("   ");

        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(snapshot.books.len(), 2);
        assert!(snapshot.category.is_none());
        assert_eq!(stub.calls(), vec![SearchIntent::Trending]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_fires_without_debounce() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("category:science", Ok(results_of(&["s1"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        let started = time::Instant::now();
        controller.select_category(Category::Science);
        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;

        // Paused clock: a debounce sleep would be visible as elapsed time.
        assert!(started.elapsed() < DEFAULT_DEBOUNCE);
        assert_eq!(snapshot.category, Some(Category::Science));
        assert_eq!(
            stub.calls(),
            vec![SearchIntent::Category(Category::Science)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_request_wins_over_slow_predecessor() {
        let stub = Arc::new(StubCatalog::default());
        let science_gate = stub.gate("category:science");
        stub.respond("category:science", Ok(results_of(&["slow"])));
        stub.respond("category:history", Ok(results_of(&["fast"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.select_category(Category::Science);
        wait_for(&mut rx, |s| s.is_loading()).await;

        controller.select_category(Category::History);
        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(snapshot.books[0].id, "fast");

        // Let the superseded request complete anyway; it must not be applied.
        science_gate.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, SearchPhase::Ready);
        assert_eq!(snapshot.books[0].id, "fast");
        assert_eq!(snapshot.category, Some(Category::History));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_retains_results_while_loading() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("trending", Ok(results_of(&["t1", "t2", "t3"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.load_trending();
        wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;

        let gate = stub.gate("trending");
        controller.refresh();
        let snapshot = wait_for(&mut rx, |s| s.is_loading()).await;
        assert_eq!(snapshot.books.len(), 3);
        assert_eq!(snapshot.total_count, 3);

        gate.notify_one();
        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(snapshot.books.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_without_intent_loads_trending() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("trending", Ok(results_of(&["t1"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.refresh();
        wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(stub.calls(), vec![SearchIntent::Trending]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_message_surfaces_on_error() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond(
            "text:dune",
            Err(CatalogError::Upstream {
                status: 500,
                message: "Daily quota exceeded".to_string(),
            }),
        );
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.submit_free_text("dune");
        let snapshot =
            wait_for(&mut rx, |s| matches!(s.phase, SearchPhase::Errored(_))).await;
        assert_eq!(snapshot.error_message(), Some("Daily quota exceeded"));
        assert!(snapshot.books.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_surfaces_generic_message() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond(
            "text:dune",
            Err(CatalogError::Unreachable("connection refused".to_string())),
        );
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.submit_free_text("dune");
        let snapshot =
            wait_for(&mut rx, |s| matches!(s.phase, SearchPhase::Errored(_))).await;
        assert_eq!(
            snapshot.error_message(),
            Some("Failed to search books. Please try again.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_text_clears_category_selection() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("category:fiction", Ok(results_of(&["f1"])));
        stub.respond("text:dune", Ok(results_of(&["d1"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.select_category(Category::Fiction);
        let snapshot = wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;
        assert_eq!(snapshot.category, Some(Category::Fiction));

        controller.submit_free_text("dune");
        let snapshot = wait_for(&mut rx, |s| {
            s.phase == SearchPhase::Ready && s.books[0].id == "d1"
        })
        .await;
        assert!(snapshot.category.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_and_reloads_trending() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond("category:history", Ok(results_of(&["h1"])));
        stub.respond("trending", Ok(results_of(&["t1"])));
        let controller = controller_with(Arc::clone(&stub));
        let mut rx = controller.subscribe();

        controller.select_category(Category::History);
        wait_for(&mut rx, |s| s.phase == SearchPhase::Ready).await;

        controller.clear();
        let snapshot = wait_for(&mut rx, |s| {
            s.phase == SearchPhase::Ready && !s.books.is_empty() && s.books[0].id == "t1"
        })
        .await;
        assert!(snapshot.category.is_none());
        assert_eq!(
            stub.calls(),
            vec![
                SearchIntent::Category(Category::History),
                SearchIntent::Trending
            ]
        );
    }

    #[tokio::test]
    async fn test_get_by_id_maps_not_found_message() {
        let stub = Arc::new(StubCatalog::default());
        let controller = controller_with(Arc::clone(&stub));

        let err = controller.get_by_id("404-id").await.unwrap_err();
        assert_eq!(err, "Book not found");
    }

    #[tokio::test]
    async fn test_get_by_id_maps_generic_failure_message() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond_detail(
            "vol-9",
            Err(CatalogError::Unreachable("dns".to_string())),
        );
        let controller = controller_with(Arc::clone(&stub));

        let err = controller.get_by_id("vol-9").await.unwrap_err();
        assert_eq!(err, "Failed to fetch book details");
    }

    #[tokio::test]
    async fn test_get_by_id_passes_book_through() {
        let stub = Arc::new(StubCatalog::default());
        stub.respond_detail("vol-1", Ok(test_book("vol-1")));
        let controller = controller_with(Arc::clone(&stub));

        let book = controller.get_by_id("vol-1").await.unwrap();
        assert_eq!(book.id, "vol-1");
    }

    #[test]
    fn test_stub_intent_keys() {
        assert_eq!(intent_key(&SearchIntent::Trending), "trending");
        assert_eq!(
            intent_key(&SearchIntent::Category(Category::SelfHelp)),
            "category:self-help"
        );
    }
}
