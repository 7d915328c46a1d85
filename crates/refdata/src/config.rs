use std::{env, time::Duration};

use crate::lookup::DuplicatePolicy;

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "refdata.db")
    pub sqlite_path: String,
    /// Wikidata SPARQL endpoint (default: "https://query.wikidata.org/sparql")
    pub wikidata_sparql_url: String,
    /// User agent sent to Wikidata (default: "refdata/<version>")
    pub wikidata_user_agent: String,
    /// Wikidata request timeout in seconds (default: 30)
    pub wikidata_timeout_seconds: u64,
    /// Minimum seconds between source calls, fractions allowed (default: 1)
    pub source_rate_limit_seconds: f64,
    /// Whether absorbed duplicate write-backs are logged (default: true)
    pub log_duplicate_write_back: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REFDATA_SQLITE_PATH` - SQLite database path (default: "refdata.db")
    /// - `WIKIDATA_SPARQL_URL` - SPARQL endpoint (default: "https://query.wikidata.org/sparql")
    /// - `WIKIDATA_USER_AGENT` - HTTP user agent (default: "refdata/<version>")
    /// - `WIKIDATA_TIMEOUT_SECONDS` - Request timeout (default: 30)
    /// - `SOURCE_RATE_LIMIT_SECONDS` - Spacing between source calls (default: 1)
    /// - `LOG_DUPLICATE_WRITE_BACK` - `false` or `0` silences duplicate write-backs
    pub fn from_env() -> Self {
        Self {
            sqlite_path: env::var("REFDATA_SQLITE_PATH")
                .unwrap_or_else(|_| "refdata.db".to_string()),
            wikidata_sparql_url: env::var("WIKIDATA_SPARQL_URL")
                .unwrap_or_else(|_| "https://query.wikidata.org/sparql".to_string()),
            wikidata_user_agent: env::var("WIKIDATA_USER_AGENT")
                .unwrap_or_else(|_| format!("refdata/{}", env!("CARGO_PKG_VERSION"))),
            wikidata_timeout_seconds: env::var("WIKIDATA_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            source_rate_limit_seconds: env::var("SOURCE_RATE_LIMIT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &f64| secs.is_finite() && *secs >= 0.0)
                .unwrap_or(1.0),
            log_duplicate_write_back: env::var("LOG_DUPLICATE_WRITE_BACK")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    /// Get the source rate limit as a Duration.
    pub fn rate_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.source_rate_limit_seconds)
            .unwrap_or(Duration::from_secs(1))
    }

    /// Get the write-back duplicate policy.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.log_duplicate_write_back {
            DuplicatePolicy::Log
        } else {
            DuplicatePolicy::Silent
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0")
}
