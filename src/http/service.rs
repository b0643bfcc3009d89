//! Axum handlers exposing catalog browsing and merged search.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::cache::QueryCache;
use crate::catalog::{Catalog, CatalogEntry, CatalogStats, ALL_CATEGORY};
use crate::error::ServiceError;
use crate::merge::{dedup_remote, LocalResults, MergePolicy};
use crate::metrics;
use crate::ranker::Ranker;
use crate::remote::{RemoteResult, RemoteSearcher};

/// Longest query the API accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    remote: Arc<dyn RemoteSearcher>,
    policy: MergePolicy,
    cache: Arc<QueryCache>,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        remote: Arc<dyn RemoteSearcher>,
        policy: MergePolicy,
        cache: QueryCache,
    ) -> Self {
        Self {
            catalog,
            remote,
            policy,
            cache: Arc::new(cache),
        }
    }

    /// Local hits for `query`, grouped by tier.
    fn local_results(&self, query: &str) -> LocalResults {
        LocalResults::partition(Ranker::new(&self.catalog).search(query))
    }

    /// Whether `query` with `local_count` hits warrants a remote search.
    fn wants_remote(&self, query: &str, local_count: usize) -> bool {
        self.remote.is_enabled() && self.policy.should_query_remote(query, local_count)
    }

    /// Raw remote results for `query`, from the cache when possible.
    ///
    /// The remote is called with the trimmed query. Cache keys are also
    /// case-folded, so "Zebra" and "zebra" share one entry. Empty answers
    /// are not cached: they usually mean the backend was unreachable.
    async fn remote_results(&self, query: &str) -> Vec<RemoteResult> {
        if let Some(cached) = self.cache.get(query) {
            metrics::increment_cache_hits();
            return cached;
        }

        metrics::increment_remote_calls();
        let results = self
            .remote
            .search(query.trim(), self.policy.remote_limit)
            .await;
        if !results.is_empty() {
            self.cache.insert(query, results.clone());
        }
        results
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Local hits, returned without waiting for any remote call.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub local: LocalResults,
    /// Whether `/search/remote` will consult the remote searcher for this query
    pub remote_pending: bool,
}

/// Remote hits for a query, already deduplicated against its local hits.
#[derive(Debug, Serialize)]
pub struct RemoteSearchResponse {
    pub query: String,
    pub remote: Vec<RemoteResult>,
    /// Whether the merge policy consulted the remote searcher
    pub remote_requested: bool,
}

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub category: String,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub standard: Vec<String>,
    pub all: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub entries: usize,
    pub manifest_version: Option<String>,
    pub remote: String,
    pub remote_enabled: bool,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/search/remote", get(search_remote))
        .route("/browse", get(browse))
        .route("/categories", get(categories))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn validate_query(query: &str) -> Result<(), ServiceError> {
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ServiceError::InvalidRequest(format!(
            "query longer than {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(())
}

/// Local search. Never waits on the remote searcher; clients fetch
/// `/search/remote` in parallel when `remote_pending` is set.
#[instrument(skip(state, params), fields(query))]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServiceError> {
    let query = params.q;
    tracing::Span::current().record("query", query.as_str());
    validate_query(&query)?;

    let start = Instant::now();
    let local = state.local_results(&query);
    metrics::record_local_search_latency(start.elapsed().as_secs_f64() * 1000.0);
    metrics::increment_search_count();

    let remote_pending = state.wants_remote(&query, local.len());

    info!(
        query = %query,
        standard = local.standard.len(),
        extended = local.extended.len(),
        remote_pending,
        "Local search completed"
    );

    Ok(Json(SearchResponse {
        query,
        local,
        remote_pending,
    }))
}

/// Remote supplement for a query, deduplicated against its local hits.
#[instrument(skip(state, params), fields(query))]
async fn search_remote(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RemoteSearchResponse>, ServiceError> {
    let query = params.q;
    tracing::Span::current().record("query", query.as_str());
    validate_query(&query)?;

    let local = state.local_results(&query);
    let remote_requested = state.wants_remote(&query, local.len());

    let remote = if remote_requested {
        let raw = state.remote_results(&query).await;
        dedup_remote(&local.label_keys(), raw)
    } else {
        metrics::increment_remote_skipped();
        Vec::new()
    };

    info!(
        query = %query,
        remote = remote.len(),
        remote_requested,
        "Remote search completed"
    );

    Ok(Json(RemoteSearchResponse {
        query,
        remote,
        remote_requested,
    }))
}

#[instrument(skip(state))]
async fn browse(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<BrowseResponse>, ServiceError> {
    let category = params
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ALL_CATEGORY.to_string());

    if !state.catalog.all_categories().contains(&category) {
        return Err(ServiceError::UnknownCategory(category));
    }

    let entries = state
        .catalog
        .by_category(&category)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(BrowseResponse { category, entries }))
}

async fn categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        standard: state.catalog.standard_categories().to_vec(),
        all: state.catalog.all_categories().to_vec(),
    })
}

async fn stats(State(state): State<AppState>) -> Json<CatalogStats> {
    Json(state.catalog.stats())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "serving",
        entries: state.catalog.len(),
        manifest_version: state.catalog.meta().version.clone(),
        remote: state.remote.name().to_string(),
        remote_enabled: state.remote.is_enabled(),
    })
}
