//! Configuration module for the icon search service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::remote::symbotalk::DEFAULT_BASE_URL;

/// Which remote symbol search backend supplements local results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMode {
    /// Live SymboTalk API (ARASAAC repository)
    SymboTalk,
    /// Canned in-process results for testing
    Mock,
    /// Offline: local results only
    Off,
}

impl FromStr for RemoteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "symbotalk" => Ok(RemoteMode::SymboTalk),
            "mock" => Ok(RemoteMode::Mock),
            "off" | "none" | "offline" => Ok(RemoteMode::Off),
            _ => Err(ConfigError::Invalid {
                var: "REMOTE_MODE",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RemoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteMode::SymboTalk => "symbotalk",
            RemoteMode::Mock => "mock",
            RemoteMode::Off => "off",
        };
        f.write_str(name)
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the bundled icon manifest (JSON)
    pub manifest_path: String,
    /// Search API HTTP port
    pub http_port: u16,
    /// Prometheus metrics HTTP port
    pub metrics_port: u16,
    /// Bind address (supports IPv4, IPv6, or dual-stack)
    pub bind_address: String,
    /// Remote search backend
    pub remote_mode: RemoteMode,
    /// SymboTalk API base URL
    pub symbotalk_base_url: String,
    /// Per-request timeout for the remote search call
    pub remote_timeout: Duration,
    /// Local hit count below which the remote search is consulted
    pub remote_threshold: usize,
    /// Result cap passed to the remote search
    pub remote_limit: usize,
    /// How long remote results stay cached per query
    pub cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `MANIFEST_PATH` - Path to the manifest (default: data/extended-manifest.json)
    /// - `HTTP_PORT` - Search API port (default: 8080)
    /// - `METRICS_PORT` - Prometheus metrics port (default: 9090)
    /// - `BIND_ADDRESS` - Bind address (default: auto-detect [::] or 0.0.0.0)
    /// - `REMOTE_MODE` - symbotalk, mock or off (default: symbotalk)
    /// - `SYMBOTALK_BASE_URL` - Remote API base URL
    /// - `REMOTE_TIMEOUT_MS` - Remote request timeout (default: 5000)
    /// - `REMOTE_THRESHOLD` - Local hit count that suppresses the remote call (default: 20)
    /// - `REMOTE_LIMIT` - Remote result cap (default: 30)
    /// - `CACHE_TTL_SECS` - Remote result cache lifetime (default: 300)
    ///
    /// `RUST_LOG` is read by the tracing subscriber in `main`, before the
    /// configuration is loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let manifest_path = env::var("MANIFEST_PATH")
            .unwrap_or_else(|_| "data/extended-manifest.json".to_string());

        // An explicitly empty path is a deployment mistake, not a request for the default
        if manifest_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MANIFEST_PATH"));
        }

        let remote_mode = match env::var("REMOTE_MODE") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => RemoteMode::SymboTalk,
        };

        let symbotalk_base_url =
            env::var("SYMBOTALK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        if remote_mode == RemoteMode::SymboTalk && !symbotalk_base_url.starts_with("http") {
            return Err(ConfigError::Invalid {
                var: "SYMBOTALK_BASE_URL",
                value: symbotalk_base_url,
            });
        }

        let remote_limit = parse_or("REMOTE_LIMIT", 30usize);
        if remote_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "REMOTE_LIMIT",
                value: "0".to_string(),
            });
        }

        // Bind address with auto-detect fallback
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "auto".to_string());

        Ok(Config {
            manifest_path,
            http_port: parse_or("HTTP_PORT", 8080),
            metrics_port: parse_or("METRICS_PORT", 9090),
            bind_address,
            remote_mode,
            symbotalk_base_url,
            remote_timeout: Duration::from_millis(parse_or("REMOTE_TIMEOUT_MS", 5000)),
            remote_threshold: parse_or("REMOTE_THRESHOLD", 20),
            remote_limit,
            cache_ttl: Duration::from_secs(parse_or("CACHE_TTL_SECS", 300)),
        })
    }
}

/// Unparseable numeric values fall back to the default.
fn parse_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "MANIFEST_PATH",
            "HTTP_PORT",
            "METRICS_PORT",
            "BIND_ADDRESS",
            "REMOTE_MODE",
            "SYMBOTALK_BASE_URL",
            "REMOTE_TIMEOUT_MS",
            "REMOTE_THRESHOLD",
            "REMOTE_LIMIT",
            "CACHE_TTL_SECS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.manifest_path, "data/extended-manifest.json");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.bind_address, "auto");
        assert_eq!(config.remote_mode, RemoteMode::SymboTalk);
        assert_eq!(config.symbotalk_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.remote_timeout, Duration::from_millis(5000));
        assert_eq!(config.remote_threshold, 20);
        assert_eq!(config.remote_limit, 30);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back_to_defaults() {
        clear_env();
        env::set_var("HTTP_PORT", "not-a-port");
        env::set_var("REMOTE_THRESHOLD", "-4");

        let config = Config::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.remote_threshold, 20);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_log_filter_is_not_part_of_config() {
        clear_env();
        let saved = env::var("RUST_LOG").ok();
        env::set_var("RUST_LOG", "aac_icon_search=trace,not a level");

        let config = Config::from_env().unwrap();
        assert_eq!(config.http_port, 8080);

        match saved {
            Some(value) => env::set_var("RUST_LOG", value),
            None => env::remove_var("RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_empty_manifest_path_is_rejected() {
        clear_env();
        env::set_var("MANIFEST_PATH", "  ");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("MANIFEST_PATH")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_remote_mode_is_rejected() {
        clear_env();
        env::set_var("REMOTE_MODE", "carrier-pigeon");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "REMOTE_MODE", .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_remote_limit_is_rejected() {
        clear_env();
        env::set_var("REMOTE_LIMIT", "0");

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_remote_mode_parsing() {
        assert_eq!("MOCK".parse::<RemoteMode>().unwrap(), RemoteMode::Mock);
        assert_eq!(" off ".parse::<RemoteMode>().unwrap(), RemoteMode::Off);
        assert_eq!("offline".parse::<RemoteMode>().unwrap(), RemoteMode::Off);
        assert_eq!(
            "symbotalk".parse::<RemoteMode>().unwrap(),
            RemoteMode::SymboTalk
        );
        assert_eq!(RemoteMode::Mock.to_string(), "mock");
    }
}
