use std::fmt;

use async_trait::async_trait;

use crate::core::book::Book;
use crate::core::intent::SearchIntent;

/// Failures a catalog request can end in.
/// `Cancelled` is plumbing, not an error condition: the controller absorbs
/// it and never shows it to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The intent cannot become a query (empty free text). Caught before
    /// any network call is made.
    Validation(String),
    /// Single-record fetch hit a 404.
    NotFound,
    /// The provider answered with an error status. `message` carries the
    /// provider's own message when its error body had one, else it is empty.
    Upstream { status: u16, message: String },
    /// No response at all (DNS, refused connection, timeout).
    Unreachable(String),
    /// A success status whose body was not the expected envelope.
    Decode(String),
    /// The request was superseded or explicitly aborted.
    Cancelled,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Validation(msg) => write!(f, "invalid query: {msg}"),
            CatalogError::NotFound => write!(f, "record not found"),
            CatalogError::Upstream { status, message } => {
                write!(f, "catalog error (HTTP {status}): {message}")
            }
            CatalogError::Unreachable(msg) => write!(f, "network error: {msg}"),
            CatalogError::Decode(msg) => write!(f, "decode error: {msg}"),
            CatalogError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// One page of normalized search results, in the provider's relevance order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub books: Vec<Book>,
    /// The provider's reported total across all pages, 0 when unreported.
    pub total_count: u64,
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Executes one search for the given intent and returns the normalized
    /// page of results.
    async fn search(&self, intent: &SearchIntent) -> Result<SearchResults, CatalogError>;

    /// Fetches a single record by its catalog id.
    async fn fetch_by_id(&self, id: &str) -> Result<Book, CatalogError>;
}
