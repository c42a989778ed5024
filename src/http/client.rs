//! Single-attempt HTTP transport.
//!
//! A transport performs exactly one GET and reports failure as a value; the
//! retry policy lives with the caller.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};

/// Errors raised below the API layer: the request never produced a usable
/// body. All of them are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout and other send errors
    Connect(String),
    /// The server answered with a non-success HTTP status
    Status(u16),
    /// The body could not be read to completion
    Body(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect(msg) => write!(f, "Request failed: {}", msg),
            TransportError::Status(code) => write!(f, "HTTP {} error", code),
            TransportError::Body(msg) => write!(f, "Failed to read response body: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one GET request and return the response body.
    async fn get_text(&self, url: &Url) -> Result<String, TransportError>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client that identifies itself as this tool.
    pub fn with_user_agent() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("commute-grid/", env!("COMMUTE_GRID_VERSION")))
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[tracing::instrument(skip(self, url))]
    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        // The query string carries the API key, so only the path is logged.
        debug!("GET {}{}...", url.origin().ascii_serialization(), url.path());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}
