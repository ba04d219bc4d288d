//! External entity resolution with memoization.
//!
//! [`EntityResolver`] translates free-text queries into canonical
//! knowledge-graph identifiers. Lookups are memoized — including negative
//! results — and backend failure degrades to an empty answer instead of
//! propagating: resolution is best-effort enrichment of a larger workflow
//! that must never be blocked by it.

pub mod kgsearch;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::cache::CacheStore;

pub use kgsearch::KgSearchClient;

/// Cache key namespace, versioned so a format change invalidates en masse.
const CACHE_PREFIX: &str = "kg1:";

/// How long resolved identifiers (positive or negative) stay memoized.
const CACHE_TTL_HOURS: i64 = 4;

/// Scheme token the backend prefixes identifiers with.
const ID_SCHEME_PREFIX: &str = "kg:";

/// Language preferences sent with every search, in order.
const LANGUAGES: [&str; 2] = ["ja", "zh"];

/// The single entity category searched.
const ENTITY_TYPE: &str = "Person";

/// Errors from the external search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport-level failure.
    #[error("Search network error: {0}")]
    Network(String),

    /// Non-success response from the backend.
    #[error("Search API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, best effort.
        message: String,
    },

    /// Response body could not be interpreted.
    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

/// A search request: free text plus the fixed restriction knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Ordered language preferences.
    pub languages: Vec<String>,
    /// Entity category restriction.
    pub entity_type: String,
    /// Maximum number of ranked results.
    pub limit: usize,
}

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Entity identifier, still carrying the scheme prefix.
    pub id: String,
    /// Backend ranking score.
    pub score: f64,
    /// The raw result node, kept for diagnostic rendering.
    pub result: Value,
}

/// External search backend seam.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Executes a search, returning ranked hits.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError>;
}

/// Memoized, fail-open entity resolver.
pub struct EntityResolver {
    cache: Arc<dyn CacheStore>,
    backend: Arc<dyn SearchBackend>,
}

impl EntityResolver {
    /// Creates a resolver over the given cache and backend.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>, backend: Arc<dyn SearchBackend>) -> Self {
        Self { cache, backend }
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            languages: LANGUAGES.iter().map(|l| (*l).to_string()).collect(),
            entity_type: ENTITY_TYPE.to_string(),
            limit: 1,
        }
    }

    fn cache_key(query: &str) -> String {
        format!("{CACHE_PREFIX}{query}")
    }

    /// Resolves a free-text query to a canonical entity identifier.
    ///
    /// An empty return value means "no entity matched". This method never
    /// fails the caller: a backend error is logged and reads as empty,
    /// without poisoning the cache so a later call may still succeed.
    pub async fn resolve(&self, query: &str) -> String {
        let key = Self::cache_key(query);
        if let Some(cached) = self.cache.get(&key) {
            // Positive or explicitly negative, either way it is an answer.
            return cached;
        }

        let resolved = match self.backend.search(&Self::request(query)).await {
            Ok(hits) => hits
                .first()
                .map(|hit| hit.id.trim_start_matches(ID_SCHEME_PREFIX).to_string())
                .unwrap_or_default(),
            Err(err) => {
                warn!(%query, error = %err, "entity search failed, degrading to empty result");
                return String::new();
            }
        };

        self.cache
            .set(&key, resolved.clone(), Duration::hours(CACHE_TTL_HOURS));
        resolved
    }

    /// Issues the same search uncached and renders the raw top result as
    /// pretty-printed JSON (`"null"` when nothing matched). Diagnostic
    /// use; errors propagate.
    ///
    /// # Errors
    /// Any backend failure.
    pub async fn raw_query(&self, query: &str) -> Result<String, SearchError> {
        let hits = self.backend.search(&Self::request(query)).await?;
        let node = hits.first().map_or(Value::Null, |hit| hit.result.clone());
        serde_json::to_string_pretty(&node).map_err(|e| SearchError::Parse(e.to_string()))
    }
}
