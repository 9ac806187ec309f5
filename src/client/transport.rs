//! HTTP transport seam

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

/// Status line and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// e.g. `404 Not Found`
    pub status_line: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending requests to the index server
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    async fn post(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ossindex-client/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_line: status.to_string(),
            body,
        })
    }
}

/// A request that never produced a full response within the timeout means
/// the server is out of reach. Other failures, such as a broken body, are HTTP errors.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() || error.is_timeout() || error.is_request() {
        TransportError::Unreachable(error.to_string())
    } else {
        TransportError::Http(error.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        Self::read(response).await
    }

    async fn post(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(classify)?;
        Self::read(response).await
    }
}
