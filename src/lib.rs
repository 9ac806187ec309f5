//! Caching client for the OSS Index resource API
//!
//! Look up files (by SHA-1), artifacts (by package coordinates), packages,
//! source repositories and vulnerabilities. Responses are kept in a
//! [`PersistentCache`](cache::PersistentCache) and served from it while the
//! server is unreachable.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use ossindex_client::cache::{PersistentCache, SqliteStore};
//! use ossindex_client::config::{ClientConfig, db_path};
//! use ossindex_client::registry::ResourceRegistry;
//!
//! let cache = PersistentCache::new(SqliteStore::open(&db_path())?);
//! let registry = ResourceRegistry::new(&ClientConfig::default(), cache)?;
//! let files = registry.find_file_resources(&["Cargo.toml"]).await?;
//! registry.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod resource;
pub mod version;
