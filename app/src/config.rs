//! Configuration management for Gatepass.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Binaries call `dotenvy::dotenv()` first so a local `.env` file works too.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `PostgreSQL` configuration; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Door scanner configuration
    pub scanner: ScannerConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
    /// Base URL of the public web app, used in check-in and poster links
    pub public_base_url: String,
    /// Bearer key for admin endpoints; admin API is disabled when unset
    pub admin_api_key: Option<String>,
}

/// Door scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Gatepass server the scanner validates against
    pub server_url: String,
    /// How long a result stays on screen before scanning resumes, in milliseconds
    pub reset_delay_ms: u64,
}

/// Default time a scan result is shown
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(3000);

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database: non_empty("DATABASE_URL").map(|url| DatabaseConfig {
                url,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10),
            }),
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("PORT", 8080),
                metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                metrics_port: parsed("METRICS_PORT", 9090),
                shutdown_timeout: parsed("SHUTDOWN_TIMEOUT", 30),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:5173/".to_string()),
                admin_api_key: non_empty("ADMIN_API_KEY"),
            },
            scanner: ScannerConfig {
                server_url: env::var("GATEPASS_SERVER_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                reset_delay_ms: parsed(
                    "SCANNER_RESET_DELAY_MS",
                    u64::try_from(DEFAULT_RESET_DELAY.as_millis()).unwrap_or(3000),
                ),
            },
        }
    }
}

impl ServerConfig {
    /// HTTP bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Metrics bind address
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.metrics_host, self.metrics_port)
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl ScannerConfig {
    /// Time a result stays on screen
    #[must_use]
    pub const fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}
