//! Cached access to the index REST API
//!
//! Every request is answered from the cache when a fresh enough entry exists.
//! A connect failure opens a cool-down window: the failure time is recorded,
//! the request falls back to cached data of any age, and until the window
//! elapses every read accepts cached data regardless of age.
//!
//! # Modules
//!
//! - [`transport`]: the HTTP seam and its reqwest implementation

pub mod transport;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, warn};

use crate::cache::PersistentCache;
use crate::config::ClientConfig;
use crate::error::{CacheError, ClientError, TransportError};

pub use transport::{HttpResponse, HttpTransport, Transport};

/// Marker for "no connect failure recorded"
const NO_FAILURE: i64 = 0;

/// A response body and where it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Just received from the server and stored in the cache
    Network(String),
    /// Read back from the cache, possibly past its max age during an outage
    Cached(String),
}

impl Body {
    pub fn as_str(&self) -> &str {
        match self {
            Body::Network(body) | Body::Cached(body) => body,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Body::Network(body) | Body::Cached(body) => body,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Body::Network(_))
    }

    fn map(self, f: impl FnOnce(&str) -> String) -> Self {
        match self {
            Body::Network(body) => Body::Network(f(&body)),
            Body::Cached(body) => Body::Cached(f(&body)),
        }
    }
}

/// Whether cached data is currently trusted regardless of age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, cached entries expire after the configured max age
    Closed,
    /// A recent connect failure; cached entries of any age are served
    Open,
}

pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    cache: PersistentCache,
    base_url: String,
    max_age: i64,
    cooldown: i64,
    last_failure: AtomicI64,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, cache: PersistentCache, config: &ClientConfig) -> Self {
        Self {
            transport,
            cache,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_age: config.cache.max_age,
            cooldown: config.cache.cooldown,
            last_failure: AtomicI64::new(NO_FAILURE),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn circuit_state(&self) -> CircuitState {
        let failed_at = self.last_failure.load(Ordering::SeqCst);
        if failed_at != NO_FAILURE && self.now() - failed_at <= self.cooldown {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// GET `path`. Non-success statuses yield `None` and are not cached.
    pub async fn get(&self, path: &str) -> Result<Option<Body>, ClientError> {
        if let Some(cached) = self.cache.get_fresh(path, self.read_max_age())? {
            debug!("Cache hit: {}", path);
            return Ok(Some(Body::Cached(cached)));
        }

        debug!("Cache miss, fetching: {}", path);
        match self.transport.get(&self.url(path)).await {
            Ok(response) => {
                self.clear_failure();
                if !response.is_success() {
                    warn!("GET {} returned status {}", path, response.status_line);
                    return Ok(None);
                }
                self.cache.put(path, &response.body)?;
                Ok(Some(Body::Network(response.body)))
            }
            Err(TransportError::Unreachable(reason)) => {
                self.fall_back_to_cache(path, &reason).map(Some)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// GET `path`, wrapping a single JSON value into a one-element array
    pub async fn get_array(&self, path: &str) -> Result<Option<Body>, ClientError> {
        Ok(self.get(path).await?.map(|body| body.map(as_array)))
    }

    /// POST `payload` to `path`. The response is cached under the path and
    /// payload together. Non-success statuses are errors.
    pub async fn post(&self, path: &str, payload: &str) -> Result<Body, ClientError> {
        let key = format!("{}::{}", path, payload);
        if let Some(cached) = self.cache.get_fresh(&key, self.read_max_age())? {
            debug!("Cache hit: POST {}", path);
            return Ok(Body::Cached(cached));
        }

        debug!("Cache miss, posting: {}", path);
        match self.transport.post(&self.url(path), payload).await {
            Ok(response) => {
                self.clear_failure();
                if !response.is_success() {
                    warn!("POST {} returned status {}", path, response.status_line);
                    return Err(ClientError::Status {
                        status: response.status_line,
                    });
                }
                self.cache.put(&key, &response.body)?;
                Ok(Body::Network(response.body))
            }
            Err(TransportError::Unreachable(reason)) => self.fall_back_to_cache(&key, &reason),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a response body the server did not send for this exact key
    pub fn cache_put(&self, key: &str, raw: &str) -> Result<(), ClientError> {
        self.cache.put(key, raw)?;
        Ok(())
    }

    pub fn commit(&self) -> Result<(), CacheError> {
        self.cache.commit()
    }

    pub fn close(self) -> Result<(), CacheError> {
        self.cache.close()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn now(&self) -> i64 {
        self.cache.clock().now_ms()
    }

    /// Max age for cache reads; `0` (no limit) inside the cool-down window.
    /// An elapsed window is reset here.
    fn read_max_age(&self) -> i64 {
        let failed_at = self.last_failure.load(Ordering::SeqCst);
        if failed_at == NO_FAILURE {
            return self.max_age;
        }

        if self.now() - failed_at <= self.cooldown {
            return 0;
        }

        let _ = self.last_failure.compare_exchange(
            failed_at,
            NO_FAILURE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.max_age
    }

    /// The first failure of a window wins; later ones do not extend it.
    fn record_failure(&self) {
        let now = self.now().max(1);
        let _ = self.last_failure.compare_exchange(
            NO_FAILURE,
            now,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    fn clear_failure(&self) {
        self.last_failure.store(NO_FAILURE, Ordering::SeqCst);
    }

    fn fall_back_to_cache(&self, key: &str, reason: &str) -> Result<Body, ClientError> {
        warn!("Server unreachable ({}), using cached data for {}", reason, key);
        self.record_failure();
        self.cache
            .get(key)?
            .map(Body::Cached)
            .ok_or_else(|| ClientError::Unreachable {
                path: key.to_string(),
            })
    }
}

fn as_array(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{}]", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{CONNECT_COOLDOWN_MS, ONE_DAY_MS, ONE_MINUTE_MS};
    use super::transport::MockTransport;

    const START: i64 = 1_700_000_000_000;
    const BASE: &str = "http://index.test";

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            status_line: "200 OK".to_string(),
            body: body.to_string(),
        })
    }

    fn status(code: u16, line: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: code,
            status_line: line.to_string(),
            body: String::new(),
        })
    }

    fn refused() -> Result<HttpResponse, TransportError> {
        Err(TransportError::Unreachable("connection refused".to_string()))
    }

    fn client(transport: MockTransport, clock: Arc<ManualClock>) -> ResourceClient {
        let config = ClientConfig {
            base_url: BASE.to_string(),
            ..ClientConfig::default()
        };
        let cache = PersistentCache::with_clock(crate::cache::MemoryStore::new(), clock);
        ResourceClient::new(Arc::new(transport), cache, &config)
    }

    #[tokio::test]
    async fn get_fetches_once_then_serves_from_cache() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|url| url == "http://index.test/v1.0/scm/8")
            .times(1)
            .returning(|_| ok(r#"{"id":8}"#));

        let client = client(transport, Arc::new(ManualClock::new(START)));

        assert_eq!(
            client.get("/v1.0/scm/8").await.unwrap(),
            Some(Body::Network(r#"{"id":8}"#.to_string()))
        );
        assert_eq!(
            client.get("/v1.0/scm/8").await.unwrap(),
            Some(Body::Cached(r#"{"id":8}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let clock = Arc::new(ManualClock::new(START));
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(2)
            .returning(|_| ok(r#"{"id":8}"#));

        let client = client(transport, clock.clone());
        client.get("/v1.0/scm/8").await.unwrap();
        clock.advance(ONE_DAY_MS);
        client.get("/v1.0/scm/8").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_get_is_empty_and_uncached() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(2)
            .returning(|_| status(404, "404 Not Found"));

        let client = client(transport, Arc::new(ManualClock::new(START)));

        assert_eq!(client.get("/v1.0/scm/404").await.unwrap(), None);
        assert_eq!(client.get("/v1.0/scm/404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_success_post_is_an_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_, _| status(503, "503 Service Unavailable"));

        let client = client(transport, Arc::new(ManualClock::new(START)));
        let result = client.post("/v2.0/package", "[]").await;

        match result {
            Err(ClientError::Status { status }) => assert_eq!(status, "503 Service Unavailable"),
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn post_is_cached_under_path_and_payload() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|url, body| url == "http://index.test/v1.0/search/artifact/" && body == "[1]")
            .times(1)
            .returning(|_, _| ok("[]"));
        transport
            .expect_post()
            .withf(|_, body| body == "[2]")
            .times(1)
            .returning(|_, _| ok(r#"[{"id":2}]"#));

        let client = client(transport, Arc::new(ManualClock::new(START)));

        assert_eq!(
            client.post("/v1.0/search/artifact/", "[1]").await.unwrap(),
            Body::Network("[]".to_string())
        );
        assert_eq!(
            client.post("/v1.0/search/artifact/", "[1]").await.unwrap(),
            Body::Cached("[]".to_string())
        );
        assert_eq!(
            client.post("/v1.0/search/artifact/", "[2]").await.unwrap().as_str(),
            r#"[{"id":2}]"#
        );
    }

    #[tokio::test]
    async fn get_array_wraps_single_objects() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|url| if url.ends_with("/1") { ok(r#" {"id":1} "#) } else { ok("[{\"id\":2}]") });

        let client = client(transport, Arc::new(ManualClock::new(START)));

        assert_eq!(
            client.get_array("/v1.0/scm/1").await.unwrap(),
            Some(Body::Network(r#"[{"id":1}]"#.to_string()))
        );
        assert_eq!(
            client.get_array("/v1.0/scm/2").await.unwrap(),
            Some(Body::Network(r#"[{"id":2}]"#.to_string()))
        );
    }

    #[tokio::test]
    async fn connect_failure_serves_stale_cache_and_opens_circuit() {
        let clock = Arc::new(ManualClock::new(START));
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok(r#"{"id":8}"#));
        transport
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| refused());

        let client = client(transport, clock.clone());
        client.get("/v1.0/scm/8").await.unwrap();

        clock.advance(2 * ONE_DAY_MS);
        let stale = client.get("/v1.0/scm/8").await.unwrap();

        assert_eq!(stale, Some(Body::Cached(r#"{"id":8}"#.to_string())));
        assert_eq!(client.circuit_state(), CircuitState::Open);

        // Inside the window the stale entry is served without touching the network
        clock.advance(5 * ONE_MINUTE_MS);
        assert_eq!(
            client.get("/v1.0/scm/8").await.unwrap(),
            Some(Body::Cached(r#"{"id":8}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn first_failure_wins_and_window_closes_after_cooldown() {
        let clock = Arc::new(ManualClock::new(START));
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_get()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| refused());
        transport
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok(r#"{"id":3}"#));

        let client = client(transport, clock.clone());
        client.cache_put("/v1.0/scm/2", r#"{"id":2}"#).unwrap();
        clock.advance(2 * ONE_DAY_MS);

        // First failure opens the window
        assert!(matches!(
            client.get("/v1.0/scm/missing-1").await,
            Err(ClientError::Unreachable { .. })
        ));
        assert_eq!(client.circuit_state(), CircuitState::Open);

        // A later failure inside the window does not extend it
        clock.advance(CONNECT_COOLDOWN_MS - ONE_MINUTE_MS);
        assert!(client.get("/v1.0/scm/missing-2").await.is_err());
        clock.advance(2 * ONE_MINUTE_MS);
        assert_eq!(client.circuit_state(), CircuitState::Closed);

        // Window elapsed: bounded freshness is back, so the stale entry is refetched
        assert_eq!(
            client.get("/v1.0/scm/2").await.unwrap(),
            Some(Body::Network(r#"{"id":3}"#.to_string()))
        );
    }

    #[tokio::test]
    async fn unreachable_without_cache_is_an_error() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(1).returning(|_, _| refused());

        let client = client(transport, Arc::new(ManualClock::new(START)));
        let result = client.post("/v2.0/package", "[]").await;

        match result {
            Err(ClientError::Unreachable { path }) => assert_eq!(path, "/v2.0/package::[]"),
            other => panic!("expected unreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_errors_propagate_without_opening_circuit() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Err(TransportError::Http("body truncated".to_string())));

        let client = client(transport, Arc::new(ManualClock::new(START)));

        assert!(matches!(
            client.get("/v1.0/scm/1").await,
            Err(ClientError::Transport(TransportError::Http(_)))
        ));
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn as_array_leaves_arrays_alone() {
        assert_eq!(as_array("[1,2]"), "[1,2]");
        assert_eq!(as_array("\n{\"a\":1}\n"), "[{\"a\":1}]");
    }
}
