//! Searcher trait defining the interface to remote symbol search.

use async_trait::async_trait;
use serde::Serialize;

/// A symbol found by a remote search.
///
/// Remote results are never part of the catalog: they carry no tier or
/// priority and live only as long as the query that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteResult {
    pub id: String,
    pub label: String,
    pub image_ref: String,
    pub category_tag: String,
}

/// Trait defining the interface for remote symbol search.
///
/// Implementations include:
/// - `SymboTalkSearcher` - SymboTalk HTTP API (ARASAAC symbols)
/// - `MockRemoteSearcher` - Canned results for testing
/// - `DisabledRemoteSearcher` - Offline mode
///
/// Searches are infallible from the caller's point of view: any network,
/// protocol or payload failure yields an empty list.
#[async_trait]
pub trait RemoteSearcher: Send + Sync {
    /// Search for up to `limit` symbols matching `query`.
    async fn search(&self, query: &str, limit: usize) -> Vec<RemoteResult>;

    /// Short backend name for logs and health output.
    fn name(&self) -> &str;

    /// Whether calling [`RemoteSearcher::search`] can ever return results.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Remote searcher used when the service runs offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRemoteSearcher;

#[async_trait]
impl RemoteSearcher for DisabledRemoteSearcher {
    async fn search(&self, _query: &str, _limit: usize) -> Vec<RemoteResult> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "off"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
