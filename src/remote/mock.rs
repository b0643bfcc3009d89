//! Mock remote searcher for testing without network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

use super::searcher::{RemoteResult, RemoteSearcher};
use super::symbotalk::SEARCH_RESULTS_CATEGORY;

/// Mock searcher that answers from a fixed symbol set.
///
/// Matches by case-insensitive label substring. Can be told to sleep before
/// answering or to behave like a failing backend (always empty), and records
/// every query it receives.
pub struct MockRemoteSearcher {
    symbols: Vec<RemoteResult>,
    delay: Option<Duration>,
    failing: bool,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockRemoteSearcher {
    /// Create a mock with a small built-in symbol set.
    pub fn new() -> Self {
        info!("Initializing MockRemoteSearcher with sample symbols");
        let symbols = [
            (2248, "apple"),
            (2462, "apple juice"),
            (2349, "pineapple"),
            (3012, "ball"),
            (6922, "water"),
            (2445, "watermelon"),
            (7145, "tiger"),
            (2807, "zebra"),
            (2617, "toothbrush"),
            (3244, "swing"),
        ]
        .into_iter()
        .map(|(id, label)| mock_symbol(id, label))
        .collect();
        Self::with_results(symbols)
    }

    /// Create a mock answering from `symbols`.
    pub fn with_results(symbols: Vec<RemoteResult>) -> Self {
        Self {
            symbols,
            delay: None,
            failing: false,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `delay` before answering each search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Simulate a backend that always fails (empty results).
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of searches issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for MockRemoteSearcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a symbol shaped like a SymboTalk result.
pub fn mock_symbol(id: u64, label: &str) -> RemoteResult {
    RemoteResult {
        id: format!("symbotalk-{id}"),
        label: label.to_string(),
        image_ref: format!("https://static.example.org/symbols/{id}.png"),
        category_tag: SEARCH_RESULTS_CATEGORY.to_string(),
    }
}

#[async_trait]
impl RemoteSearcher for MockRemoteSearcher {
    async fn search(&self, query: &str, limit: usize) -> Vec<RemoteResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing {
            info!(query = %query, "Mock remote search failing on purpose");
            return Vec::new();
        }

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let hits: Vec<RemoteResult> = self
            .symbols
            .iter()
            .filter(|s| s.label.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect();

        info!(query = %query, hits = hits.len(), "Mock remote search completed");
        hits
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_search_matches_substring() {
        let searcher = MockRemoteSearcher::new();
        let hits = searcher.search("Apple", 30).await;

        let labels: Vec<&str> = hits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["apple", "apple juice", "pineapple"]);
        assert!(hits.iter().all(|h| h.category_tag == SEARCH_RESULTS_CATEGORY));
    }

    #[tokio::test]
    async fn test_mock_search_respects_limit() {
        let searcher = MockRemoteSearcher::new();
        assert_eq!(searcher.search("apple", 2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_mock_is_empty_and_counted() {
        let searcher = MockRemoteSearcher::new().failing();
        assert!(searcher.search("apple", 30).await.is_empty());
        assert_eq!(searcher.call_count(), 1);
        assert_eq!(searcher.queries(), vec!["apple".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let searcher = MockRemoteSearcher::new();
        assert!(searcher.search("  ", 30).await.is_empty());
    }
}
