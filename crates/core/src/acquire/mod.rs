//! Input acquisition: turns a [`ConversionRequest`] into bytes.
//!
//! Uploads are passed through untouched. URLs are downloaded in full through
//! a [`RemoteFetcher`] before any transcoding starts.

mod error;
mod fetcher;
mod types;

pub use error::AcquireError;
pub use fetcher::{HttpFetcher, RemoteFetcher};
pub use types::{AcquiredInput, ConversionRequest, InputKind};

use std::sync::Arc;

/// Obtains input bytes for a conversion.
#[derive(Clone)]
pub struct InputAcquirer {
    fetcher: Arc<dyn RemoteFetcher>,
}

impl InputAcquirer {
    pub fn new(fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn acquire(&self, request: ConversionRequest) -> Result<AcquiredInput, AcquireError> {
        match request {
            ConversionRequest::Upload { bytes, source_name } => Ok(AcquiredInput {
                bytes,
                source_name,
            }),
            ConversionRequest::Url { location } => {
                let bytes = self.fetcher.fetch(&location).await?;
                Ok(AcquiredInput {
                    bytes,
                    source_name: location,
                })
            }
        }
    }
}
