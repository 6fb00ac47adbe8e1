//! Outbound fetch of remote input.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use super::error::AcquireError;
use crate::config::FetchConfig;

/// Downloads a remote resource completely into memory.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, AcquireError>;
}

/// reqwest-backed fetcher. Follows redirects; applies the configured
/// timeouts and size cap when they are set.
pub struct HttpFetcher {
    client: Client,
    max_bytes: Option<u64>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            max_bytes: config.max_bytes,
        })
    }

    fn parse_url(url: &str) -> Result<Url, AcquireError> {
        let parsed = Url::parse(url).map_err(|e| AcquireError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(AcquireError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AcquireError> {
        let parsed = Self::parse_url(url)?;

        debug!(url = %parsed, "Sending GET request");
        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AcquireError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        debug!(status = %response.status(), "Got response");

        if !response.status().is_success() {
            return Err(AcquireError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let (Some(limit), Some(len)) = (self.max_bytes, response.content_length()) {
            if len > limit {
                return Err(AcquireError::TooLarge {
                    url: url.to_string(),
                    limit_bytes: limit,
                });
            }
        }

        let mut body = BytesMut::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| AcquireError::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            let Some(chunk) = chunk else { break };

            body.extend_from_slice(&chunk);
            if let Some(limit) = self.max_bytes {
                if body.len() as u64 > limit {
                    return Err(AcquireError::TooLarge {
                        url: url.to_string(),
                        limit_bytes: limit,
                    });
                }
            }
        }

        Ok(body.freeze())
    }
}
