//! HTTP API for the icon search service.

mod service;

pub use service::{
    router, AppState, BrowseResponse, CategoriesResponse, HealthResponse, RemoteSearchResponse,
    SearchResponse, MAX_QUERY_CHARS,
};

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Bind a listener for `bind_address` and `port`.
///
/// `auto` tries dual-stack `[::]` first and falls back to IPv4-only
/// `0.0.0.0`. Bare IPv6 addresses are bracketed.
pub async fn bind_listener(bind_address: &str, port: u16) -> std::io::Result<TcpListener> {
    if bind_address == "auto" {
        let dual_stack = SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, port));
        return match TcpListener::bind(dual_stack).await {
            Ok(listener) => {
                info!(port, "Auto-detected dual-stack support, using [::]");
                Ok(listener)
            }
            Err(_) => {
                info!(port, "IPv6 not available, falling back to IPv4 (0.0.0.0)");
                TcpListener::bind(SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, port))).await
            }
        };
    }

    let addr = if bind_address.contains(':') && !bind_address.starts_with('[') {
        format!("[{}]:{}", bind_address, port)
    } else {
        format!("{}:{}", bind_address, port)
    };
    TcpListener::bind(addr).await
}
