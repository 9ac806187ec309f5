use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache store is closed")]
    Closed,

    #[error("Cache directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by a [`Transport`](crate::client::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote host could not be reached (refused, DNS, timeout).
    #[error("Remote host unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Remote host unreachable and no cached response for {path}")]
    Unreachable { path: String },

    #[error("Request failed with status {status}")]
    Status { status: String },

    #[error("Malformed response for {path}: {source}")]
    MalformedResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
