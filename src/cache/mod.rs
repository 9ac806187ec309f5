//! Query cache with insertion timestamps
//!
//! Values are persisted as `(T=<epoch-millis>)<json>`. Entries written without
//! the tag (older cache files) are still readable through [`PersistentCache::get`]
//! but never count as fresh.
//!
//! # Modules
//!
//! - [`memory`]: process-local store backed by a concurrent map
//! - [`sqlite`]: durable store backed by a SQLite database

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

const TIMESTAMP_PREFIX: &str = "(T=";

/// Raw key/value backing store for the query cache
#[cfg_attr(test, automock)]
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Insert or overwrite the value stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Make pending writes durable
    fn flush(&self) -> Result<(), CacheError>;

    /// Flush and release the underlying resources
    fn close(&self) -> Result<(), CacheError>;
}

/// A stored blob split into its timestamp tag and body
#[derive(Debug, PartialEq, Eq)]
struct Entry<'a> {
    timestamp: Option<i64>,
    body: &'a str,
}

impl<'a> Entry<'a> {
    fn parse(blob: &'a str) -> Self {
        let Some(rest) = blob.strip_prefix(TIMESTAMP_PREFIX) else {
            return Self {
                timestamp: None,
                body: blob,
            };
        };

        match rest.split_once(')') {
            Some((stamp, body)) => Self {
                timestamp: stamp.parse().ok(),
                body,
            },
            None => Self {
                timestamp: None,
                body: blob,
            },
        }
    }
}

pub struct PersistentCache {
    store: Box<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl PersistentCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: impl CacheStore + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Box::new(store),
            clock,
        }
    }

    /// Process-local cache, nothing survives the process
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Store `raw` under `key`, tagged with the current time
    pub fn put(&self, key: &str, raw: &str) -> Result<(), CacheError> {
        let now = self.clock.now_ms();
        self.store
            .save(key, &format!("{}{}){}", TIMESTAMP_PREFIX, now, raw))
    }

    /// Stored value regardless of its age
    pub fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self
            .store
            .load(key)?
            .map(|blob| Entry::parse(&blob).body.to_string());
        Ok(value)
    }

    /// Stored value if it is younger than `max_age_ms`.
    ///
    /// A non-positive `max_age_ms` means "no limit". Stale entries are left in
    /// place so [`get`](Self::get) can still serve them.
    pub fn get_fresh(&self, key: &str, max_age_ms: i64) -> Result<Option<String>, CacheError> {
        if max_age_ms <= 0 {
            return self.get(key);
        }

        let Some(blob) = self.store.load(key)? else {
            return Ok(None);
        };

        let entry = Entry::parse(&blob);
        let Some(timestamp) = entry.timestamp else {
            debug!("Ignoring cache entry without timestamp: {}", key);
            return Ok(None);
        };

        let age = self.clock.now_ms() - timestamp;
        if age < max_age_ms {
            Ok(Some(entry.body.to_string()))
        } else {
            debug!("Cache entry expired ({}ms old): {}", age, key);
            Ok(None)
        }
    }

    pub fn commit(&self) -> Result<(), CacheError> {
        self.store.flush()
    }

    /// Flush and release the backing store. Consumes the cache so it can only
    /// happen once.
    pub fn close(self) -> Result<(), CacheError> {
        self.store.flush()?;
        self.store.close()
    }
}
