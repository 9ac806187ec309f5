use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Time-related constants
// =============================================================================

pub const ONE_MINUTE_MS: i64 = 60 * 1000;

/// Default maximum age of a cached response (24 hours)
pub const ONE_DAY_MS: i64 = 24 * 60 * ONE_MINUTE_MS;

/// How long cached data of any age is served after a connect failure (10 minutes)
pub const CONNECT_COOLDOWN_MS: i64 = 10 * ONE_MINUTE_MS;

/// Transport-level timeout for a single request (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Server locations
// =============================================================================

pub const PRODUCTION_BASE_URL: &str = "https://ossindex.net";

/// Local development server
pub const DEBUG_BASE_URL: &str = "http://localhost:8080";

/// Client configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    pub cache: CacheConfig,
    /// Request timeout in milliseconds
    pub request_timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: PRODUCTION_BASE_URL.to_string(),
            cache: CacheConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at the local debug server.
    pub fn debug() -> Self {
        Self {
            base_url: DEBUG_BASE_URL.to_string(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum age of a cached response in milliseconds
    pub max_age: i64,
    /// Cool-down window after a connect failure in milliseconds
    pub cooldown: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: ONE_DAY_MS,
            cooldown: CONNECT_COOLDOWN_MS,
        }
    }
}

/// Returns the path to the data directory for ossindex-client.
/// Uses $XDG_DATA_HOME/ossindex-client if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/ossindex-client,
/// or ./ossindex-client if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("ossindex.cache.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("ossindex-client.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("ossindex-client")
}
