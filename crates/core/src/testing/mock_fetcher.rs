//! Mock remote fetcher for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::acquire::{AcquireError, RemoteFetcher};

/// Mock implementation of the RemoteFetcher trait.
///
/// Serves canned bodies by exact URL. Any other URL answers like a server
/// returning 404.
#[derive(Debug)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, Bytes>>>,
    errors: Arc<RwLock<HashMap<String, AcquireError>>>,
    requested: Arc<RwLock<Vec<String>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            requested: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_response(&self, url: impl Into<String>, body: Bytes) {
        self.responses.write().await.insert(url.into(), body);
    }

    /// Make the next fetch of `url` fail with `error`.
    pub async fn set_error(&self, url: impl Into<String>, error: AcquireError) {
        self.errors.write().await.insert(url.into(), error);
    }

    /// Every URL fetched so far, in order.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.requested.read().await.clone()
    }
}

#[async_trait]
impl RemoteFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AcquireError> {
        self.requested.write().await.push(url.to_string());

        if let Some(err) = self.errors.write().await.remove(url) {
            return Err(err);
        }

        self.responses
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| AcquireError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
