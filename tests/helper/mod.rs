//! Shared setup for the end-to-end tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use ossindex_client::cache::{PersistentCache, SqliteStore};
use ossindex_client::clock::ManualClock;
use ossindex_client::config::ClientConfig;
use ossindex_client::registry::ResourceRegistry;

pub const START_MS: i64 = 1_700_000_000_000;

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        request_timeout: 2_000,
        ..ClientConfig::default()
    }
}

/// Registry with an in-memory cache and a clock the test controls
pub fn create_test_registry(base_url: &str) -> (ResourceRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let cache = PersistentCache::with_clock(
        ossindex_client::cache::MemoryStore::new(),
        clock.clone(),
    );
    let registry = ResourceRegistry::new(&config_for(base_url), cache).unwrap();
    (registry, clock)
}

/// Registry over a SQLite cache file inside `dir`
pub fn create_sqlite_registry(
    dir: &Path,
    base_url: &str,
    clock: Arc<ManualClock>,
) -> ResourceRegistry {
    let store = SqliteStore::open(&dir.join("ossindex.cache.db")).unwrap();
    let cache = PersistentCache::with_clock(store, clock);
    ResourceRegistry::new(&config_for(base_url), cache).unwrap()
}

pub fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// An empty file and one with unique contents
pub fn write_test_files(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let empty = dir.join("ossindex.empty.test");
    std::fs::write(&empty, b"").unwrap();

    let unique = dir.join("ossindex.unique.test");
    std::fs::write(&unique, b"q8v1t0l3c5m7n2k4j6h9g0f1d3s5a7z").unwrap();

    (empty, unique)
}
