//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible
//! defaults.

use std::net::SocketAddr;

use passgate_core::{PolicyError, RpPolicy};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 8080)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Relying Party ID, normally the bare domain (default: "localhost")
    pub rp_id: String,
    /// Human-readable Relying Party name shown during passkey creation
    pub rp_name: String,
    /// Accepted origins, comma-separated in the environment. Exact match;
    /// the first entry is the primary origin.
    pub rp_origins: Vec<String>,
    /// Pending-challenge lifetime in seconds (default: 300)
    pub challenge_ttl_secs: u64,
    /// Request body limit in KB (default: 256)
    pub body_limit_kb: usize,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Mount the /debug introspection routes (default: true for tests,
    /// false when loaded from env)
    pub debug_routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: [127, 0, 0, 1],
            rp_id: "localhost".to_string(),
            rp_name: "Passgate".to_string(),
            rp_origins: vec!["http://localhost:8080".to_string()],
            challenge_ttl_secs: 300,
            body_limit_kb: 256,
            timeout_secs: 10,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            debug_routes: true, // Enabled by default for tests; from_env() defaults to false
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or([127, 0, 0, 1]);

        let rp_id = std::env::var("RP_ID").unwrap_or_else(|_| "localhost".to_string());
        let rp_name = std::env::var("RP_NAME").unwrap_or_else(|_| "Passgate".to_string());

        let rp_origins = std::env::var("RP_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![format!("http://localhost:{port}")]);

        let challenge_ttl_secs = std::env::var("CHALLENGE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let body_limit_kb = std::env::var("BODY_LIMIT_KB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        // Rate limiting enabled by default in production, can be disabled
        // with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let rate_limit_per_sec = std::env::var("RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let rate_limit_burst = std::env::var("RATE_LIMIT_BURST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        // The user-table dump is for local inspection only; opt in explicitly.
        let debug_routes = std::env::var("DEBUG_ROUTES")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            port,
            host,
            rp_id,
            rp_name,
            rp_origins,
            challenge_ttl_secs,
            body_limit_kb,
            timeout_secs,
            rate_limit_enabled,
            rate_limit_per_sec,
            rate_limit_burst,
            debug_routes,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Build the relying-party policy from the configured identity.
    pub fn rp_policy(&self) -> Result<RpPolicy, PolicyError> {
        RpPolicy::parse(&self.rp_id, &self.rp_name, &self.rp_origins)
    }
}
