//! Icon search service for the AAC picture-choice app.
//!
//! Loads the bundled icon manifest once and serves ranked local search,
//! merged with SymboTalk symbol search when local results are thin.
//!
//! # Environment Variables
//! - `MANIFEST_PATH` - Path to the icon manifest (default: data/extended-manifest.json)
//! - `HTTP_PORT` - Search API port (default: 8080)
//! - `METRICS_PORT` - Prometheus metrics port (default: 9090)
//! - `REMOTE_MODE` - symbotalk, mock or off (default: symbotalk)
//! - `RUST_LOG` - Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aac_icon_search::cache::{QueryCache, DEFAULT_CACHE_CAPACITY};
use aac_icon_search::catalog::Catalog;
use aac_icon_search::config::{Config, RemoteMode};
use aac_icon_search::http::{self, AppState};
use aac_icon_search::merge::MergePolicy;
use aac_icon_search::metrics;
use aac_icon_search::remote::{
    DisabledRemoteSearcher, MockRemoteSearcher, RemoteSearcher, SymboTalkSearcher,
};

/// Run healthcheck mode: query the local /health endpoint and exit.
/// Tries both IPv6 and IPv4 loopback for dual-stack support.
async fn run_healthcheck() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "8080".to_string());
    let urls = match std::env::var("HEALTH_URL") {
        Ok(url) => vec![url],
        Err(_) => vec![
            format!("http://[::1]:{}/health", port),
            format!("http://127.0.0.1:{}/health", port),
        ],
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    for url in &urls {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                eprintln!("healthcheck: service is healthy (via {})", url);
                std::process::exit(0);
            }
            Ok(response) => {
                eprintln!("healthcheck: {} returned {}", url, response.status());
            }
            Err(_) => continue,
        }
    }

    eprintln!("healthcheck: service not reachable");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (use RUST_LOG env var to control log level)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Check if running in healthcheck mode
    let program_name = std::env::args()
        .next()
        .and_then(|path| {
            std::path::Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_default();

    if program_name == "healthcheck" {
        return run_healthcheck().await;
    }

    info!("Starting icon search service");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        manifest = %config.manifest_path,
        http_port = config.http_port,
        metrics_port = config.metrics_port,
        remote_mode = %config.remote_mode,
        remote_threshold = config.remote_threshold,
        remote_limit = config.remote_limit,
        "Configuration loaded"
    );

    let metrics_handle = metrics::init_metrics()?;

    // The catalog is the one thing the service cannot run without
    let catalog = Catalog::from_path(&config.manifest_path).map_err(|e| {
        error!(error = %e, manifest = %config.manifest_path, "FATAL: Failed to load manifest");
        e
    })?;

    let remote: Arc<dyn RemoteSearcher> = match config.remote_mode {
        RemoteMode::SymboTalk => {
            info!(base_url = %config.symbotalk_base_url, "Using SymboTalk remote search");
            Arc::new(SymboTalkSearcher::new(
                config.symbotalk_base_url.clone(),
                config.remote_timeout,
            )?)
        }
        RemoteMode::Mock => {
            info!("REMOTE_MODE=mock: Using mock remote searcher");
            Arc::new(MockRemoteSearcher::new())
        }
        RemoteMode::Off => {
            info!("REMOTE_MODE=off: Serving local results only");
            Arc::new(DisabledRemoteSearcher)
        }
    };

    let policy = MergePolicy {
        threshold: config.remote_threshold,
        remote_limit: config.remote_limit,
    };
    let state = AppState::new(
        Arc::new(catalog),
        remote,
        policy,
        QueryCache::new(config.cache_ttl, DEFAULT_CACHE_CAPACITY),
    );

    // Start metrics server in background
    let metrics_bind = config.bind_address.clone();
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(&metrics_bind, metrics_port, metrics_handle).await {
            error!(error = %e, port = metrics_port, "Metrics server failed");
        }
    });

    let listener = http::bind_listener(&config.bind_address, config.http_port).await?;
    info!(addr = %listener.local_addr()?, "Starting HTTP server");

    axum::serve(listener, http::router(state)).await?;

    Ok(())
}
