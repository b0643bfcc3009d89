//! Prometheus metrics for the icon search service.
//!
//! Exposes an HTTP endpoint for Prometheus scraping.

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::http;

/// Initialize the metrics system and return the Prometheus handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    describe_histogram!(
        "icon_search_local_latency_ms",
        "Time taken to rank the local catalog in milliseconds"
    );
    describe_counter!("icon_search_total", "Total number of searches processed");
    describe_counter!(
        "icon_search_remote_calls_total",
        "Remote symbol searches issued"
    );
    describe_counter!(
        "icon_search_remote_failures_total",
        "Remote symbol searches that failed and were treated as empty"
    );
    describe_counter!(
        "icon_search_remote_skipped_total",
        "Searches answered from the local catalog alone"
    );
    describe_counter!(
        "icon_search_remote_stale_total",
        "Remote results discarded because a newer query superseded them"
    );
    describe_counter!(
        "icon_search_remote_cache_hits_total",
        "Remote searches answered from the query cache"
    );

    PrometheusBuilder::new().install_recorder()
}

/// Record a local ranking latency measurement.
pub fn record_local_search_latency(latency_ms: f64) {
    histogram!("icon_search_local_latency_ms").record(latency_ms);
}

pub fn increment_search_count() {
    counter!("icon_search_total").increment(1);
}

pub fn increment_remote_calls() {
    counter!("icon_search_remote_calls_total").increment(1);
}

pub fn increment_remote_failures() {
    counter!("icon_search_remote_failures_total").increment(1);
}

pub fn increment_remote_skipped() {
    counter!("icon_search_remote_skipped_total").increment(1);
}

pub fn increment_remote_stale() {
    counter!("icon_search_remote_stale_total").increment(1);
}

pub fn increment_cache_hits() {
    counter!("icon_search_remote_cache_hits_total").increment(1);
}

/// Create an Axum router for the metrics HTTP endpoint.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}

/// Serve the metrics endpoint on `port` until the process exits.
pub async fn start_metrics_server(
    bind_address: &str,
    port: u16,
    handle: PrometheusHandle,
) -> std::io::Result<()> {
    let listener = http::bind_listener(bind_address, port).await?;
    info!(addr = %listener.local_addr()?, "Starting metrics server");
    axum::serve(listener, metrics_router(handle)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_recording_without_recorder_is_a_noop() {
        // The metrics crate uses a no-op recorder until one is installed
        record_local_search_latency(0.4);
        increment_search_count();
        increment_remote_calls();
        increment_remote_failures();
        increment_remote_skipped();
        increment_remote_stale();
        increment_cache_hits();
    }

    #[tokio::test]
    async fn test_metrics_router_returns_metrics() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let app = metrics_router(handle);

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("content-type").is_some());
    }

    #[tokio::test]
    async fn test_metrics_server_binds_and_serves() {
        use http_body_util::{BodyExt, Empty};
        use hyper::body::Bytes;
        use std::net::TcpListener as StdTcpListener;

        // Find an available port
        let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let handle = PrometheusBuilder::new().build_recorder().handle();
        let server_handle = tokio::spawn(async move {
            let _ = start_metrics_server("127.0.0.1", port, handle).await;
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let client: hyper_util::client::legacy::Client<_, Empty<Bytes>> =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build_http();
        let uri: hyper::Uri = format!("http://127.0.0.1:{}/metrics", port)
            .parse()
            .unwrap();
        let response = client.get(uri).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8_lossy(&body_bytes);
        assert!(body_str.is_empty() || !body_str.contains("<html>"));

        server_handle.abort();
    }
}
