//! In-memory cache store

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::cache::CacheStore;
use crate::error::CacheError;

/// Sharded in-memory map; lookups on unrelated keys do not contend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<String, String>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Closed);
        }
        Ok(())
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_open()?;
        Ok(self.map.get(key).map(|v| v.value().clone()))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.ensure_open()?;
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.ensure_open()
    }

    fn close(&self) -> Result<(), CacheError> {
        self.closed.store(true, Ordering::Release);
        self.map.clear();
        Ok(())
    }
}
