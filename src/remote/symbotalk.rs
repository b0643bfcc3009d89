//! SymboTalk API client.
//!
//! SymboTalk serves the ARASAAC pictogram library (28k+ symbols) over a
//! public, unauthenticated HTTP API:
//!
//! `GET {base}/search/?name=<query>&lang=en&repo=arasaac&limit=<n>`
//!
//! The response is a JSON array of `{ "id": 2248, "name": "apple 1",
//! "image_url": "...", ... }`. The endpoint is not always well behaved
//! (HTML error pages with a 200, truncated bodies), so the payload is
//! validated element by element and anything unusable degrades to an
//! empty result.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::searcher::{RemoteResult, RemoteSearcher};
use crate::error::RemoteSearchFailure;
use crate::metrics;

pub const DEFAULT_BASE_URL: &str = "https://symbotalkapiv1.azurewebsites.net";

/// Category tag attached to every remote result.
pub const SEARCH_RESULTS_CATEGORY: &str = "Search Results";

#[derive(Debug, Deserialize)]
struct SymboTalkSymbol {
    id: serde_json::Number,
    name: String,
    image_url: String,
}

/// Remote searcher backed by the SymboTalk HTTP API.
#[derive(Debug, Clone)]
pub struct SymboTalkSearcher {
    client: reqwest::Client,
    base_url: String,
}

impl SymboTalkSearcher {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteSearchFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aac-icon-search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform the search, surfacing why it failed.
    pub async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RemoteResult>, RemoteSearchFailure> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search/", self.base_url);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("name", query),
                ("lang", "en"),
                ("repo", "arasaac"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteSearchFailure::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_symbols(&body)
    }
}

#[async_trait]
impl RemoteSearcher for SymboTalkSearcher {
    async fn search(&self, query: &str, limit: usize) -> Vec<RemoteResult> {
        let start = Instant::now();

        match self.try_search(query, limit).await {
            Ok(results) => {
                info!(
                    query = %query,
                    hits = results.len(),
                    took_ms = start.elapsed().as_millis() as u64,
                    "SymboTalk search completed"
                );
                results
            }
            Err(e) => {
                // Offline is an expected state for this app; keep it quiet
                match e {
                    RemoteSearchFailure::Transport(_) => {
                        debug!(query = %query, error = %e, "SymboTalk unreachable")
                    }
                    _ => warn!(query = %query, error = %e, "SymboTalk search failed"),
                }
                metrics::increment_remote_failures();
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "symbotalk"
    }
}

/// Decode a SymboTalk response body.
///
/// Bodies that are not a JSON array are failures; array elements that do
/// not look like a symbol are skipped.
pub fn parse_symbols(body: &str) -> Result<Vec<RemoteResult>, RemoteSearchFailure> {
    if !body.trim_start().starts_with('[') {
        return Err(RemoteSearchFailure::NotJson);
    }

    let items: Vec<Value> =
        serde_json::from_str(body).map_err(|e| RemoteSearchFailure::Decode(e.to_string()))?;

    let results = items
        .iter()
        .filter_map(|item| match SymboTalkSymbol::deserialize(item) {
            Ok(symbol) => Some(RemoteResult {
                id: format!("symbotalk-{}", symbol.id),
                label: clean_label(&symbol.name),
                image_ref: symbol.image_url,
                category_tag: SEARCH_RESULTS_CATEGORY.to_string(),
            }),
            Err(e) => {
                debug!(error = %e, "Skipping malformed SymboTalk symbol");
                None
            }
        })
        .collect();

    Ok(results)
}

/// Strip a trailing variant number from a symbol name ("salmon 1" -> "salmon").
pub fn clean_label(name: &str) -> String {
    let without_digits = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() < name.len() && without_digits.ends_with(char::is_whitespace) {
        return without_digits.trim().to_string();
    }
    name.trim().to_string()
}
