//! Snapshot Fetching
//!
//! Text fetches for the index document and the snapshot files behind it.
//!
//! ## Architecture
//!
//! - **Fetcher**: async transport seam used by the loader
//! - **HttpFetcher**: `reqwest` implementation, caching disabled
//! - **MemoryFetcher**: canned responses, for tests

mod http;
mod memory;

pub use http::HttpFetcher;
pub use memory::{MemoryFetcher, MemoryResponse};

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

/// Transport used to fetch the index and snapshot files
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    ///
    /// Non-success statuses are errors; the body of an error response is
    /// never returned.
    async fn get_text(&self, url: &Url) -> Result<String, FetchError>;
}

/// Errors that can occur while fetching
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or body transfer failure
    #[error("Request to {url} failed: {cause}")]
    Network { url: String, cause: String },

    /// Request exceeded the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// URL of the failed request, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Timeout { url } => Some(url),
            FetchError::Client(_) => None,
        }
    }
}
