//! In-memory fetcher

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{FetchError, Fetcher};

/// A canned response
#[derive(Debug, Clone)]
pub enum MemoryResponse {
    /// 200 with this body
    Body(String),
    /// Non-success status
    Status(u16),
    /// Transport failure with this cause
    Unreachable(String),
}

/// Fetcher answering from a URL → response map.
///
/// Unknown URLs answer 404. Every requested URL is recorded, so callers can
/// check what was fetched and in which order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    responses: Arc<Mutex<HashMap<String, MemoryResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: answer `url` with `body`
    pub fn body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.set(url, MemoryResponse::Body(body.into()));
        self
    }

    /// Builder method: answer `url` with an HTTP status
    pub fn status(self, url: impl Into<String>, status: u16) -> Self {
        self.set(url, MemoryResponse::Status(status));
        self
    }

    /// Builder method: fail `url` at the transport level
    pub fn unreachable(self, url: impl Into<String>, cause: impl Into<String>) -> Self {
        self.set(url, MemoryResponse::Unreachable(cause.into()));
        self
    }

    /// Replace the response for `url`
    pub fn set(&self, url: impl Into<String>, response: MemoryResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.into(), response);
        }
    }

    /// URLs requested so far, oldest first
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let key = url.to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(key.clone());
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(&key).cloned());

        match response {
            Some(MemoryResponse::Body(body)) => Ok(body),
            Some(MemoryResponse::Status(status)) => Err(FetchError::Status { url: key, status }),
            Some(MemoryResponse::Unreachable(cause)) => {
                Err(FetchError::Network { url: key, cause })
            }
            None => Err(FetchError::Status {
                url: key,
                status: 404,
            }),
        }
    }
}
