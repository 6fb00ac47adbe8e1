//! Error types for input acquisition.

use thiserror::Error;

/// Why the input bytes could not be obtained.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} exceeds {limit_bytes} bytes")]
    TooLarge { url: String, limit_bytes: u64 },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl AcquireError {
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Request { url, .. }
            | Self::Status { url, .. }
            | Self::TooLarge { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}
