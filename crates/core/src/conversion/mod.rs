//! Conversion jobs: validated request in, Opus artifact out.

mod error;
mod service;
mod types;

pub use error::ConversionError;
pub use service::ConversionService;
pub use types::{ArtifactMetadata, ConvertedAudio};
