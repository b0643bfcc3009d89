//! Per-consumer search sessions with superseded-response handling.
//!
//! A session belongs to one query input (one search box). Every call to
//! [`SearchSession::search`] gets a new sequence number; the remote part of
//! an earlier search is aborted and, should it still complete, its results
//! are reported as stale instead of being merged.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

use super::policy::{dedup_remote, LocalResults, MergePolicy};
use crate::catalog::Catalog;
use crate::metrics;
use crate::ranker::Ranker;
use crate::remote::{RemoteResult, RemoteSearcher};

/// Results of one search: local hits right away, remote hits maybe later.
#[derive(Debug)]
pub struct SearchOutcome {
    pub query: String,
    pub sequence: u64,
    pub local: LocalResults,
    /// Present only when the merge policy asked for a remote search
    pub remote: Option<RemoteHandle>,
}

/// In-flight remote search tied to the query that started it.
#[derive(Debug)]
pub struct RemoteHandle {
    query: String,
    sequence: u64,
    latest: Arc<AtomicU64>,
    task: JoinHandle<Vec<RemoteResult>>,
}

impl RemoteHandle {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether no newer search has been issued by the owning session.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.sequence
    }

    /// Wait for the remote results.
    ///
    /// Returns `None` when the search was superseded, either before or
    /// while waiting. A failed remote search resolves to an empty list.
    pub async fn resolve(self) -> Option<Vec<RemoteResult>> {
        let RemoteHandle {
            query,
            sequence,
            latest,
            task,
        } = self;
        let is_current = || latest.load(Ordering::SeqCst) == sequence;

        if !is_current() {
            task.abort();
            metrics::increment_remote_stale();
            debug!(query = %query, sequence, "Dropping superseded remote search");
            return None;
        }

        match task.await {
            Ok(results) if is_current() => Some(results),
            Ok(_) => {
                metrics::increment_remote_stale();
                debug!(query = %query, sequence, "Discarding stale remote results");
                None
            }
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(query = %query, error = %e, "Remote search task failed");
                is_current().then(Vec::new)
            }
        }
    }
}

/// Search entry point for a single query input.
pub struct SearchSession {
    catalog: Arc<Catalog>,
    remote: Arc<dyn RemoteSearcher>,
    policy: MergePolicy,
    latest: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SearchSession {
    pub fn new(catalog: Arc<Catalog>, remote: Arc<dyn RemoteSearcher>, policy: MergePolicy) -> Self {
        Self {
            catalog,
            remote,
            policy,
            latest: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Sequence number of the most recent search.
    pub fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Rank `query` locally and, when the policy asks for it, start a
    /// remote search in the background.
    ///
    /// Local results are computed synchronously. Outside a Tokio runtime no
    /// remote search can be spawned and the outcome carries local hits only.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_in_flight();

        let start = Instant::now();
        let local = LocalResults::partition(Ranker::new(&self.catalog).search(query));
        metrics::record_local_search_latency(start.elapsed().as_secs_f64() * 1000.0);
        metrics::increment_search_count();

        let remote = if self.remote.is_enabled()
            && self.policy.should_query_remote(query, local.len())
        {
            self.spawn_remote(query, sequence, local.label_keys())
        } else {
            metrics::increment_remote_skipped();
            None
        };

        debug!(
            query = %query,
            sequence,
            standard = local.standard.len(),
            extended = local.extended.len(),
            remote = remote.is_some(),
            "Local search completed"
        );

        SearchOutcome {
            query: query.to_string(),
            sequence,
            local,
            remote,
        }
    }

    fn spawn_remote(
        &self,
        query: &str,
        sequence: u64,
        local_labels: HashSet<String>,
    ) -> Option<RemoteHandle> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(query = %query, sequence, "No async runtime, skipping remote search");
                metrics::increment_remote_skipped();
                return None;
            }
        };

        let remote = Arc::clone(&self.remote);
        let limit = self.policy.remote_limit;
        let remote_query = query.trim().to_string();

        metrics::increment_remote_calls();
        let task = runtime.spawn(async move {
            let results = remote.search(&remote_query, limit).await;
            dedup_remote(&local_labels, results)
        });

        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = Some(task.abort_handle());
        }

        Some(RemoteHandle {
            query: query.to_string(),
            sequence,
            latest: Arc::clone(&self.latest),
            task,
        })
    }

    fn cancel_in_flight(&self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
