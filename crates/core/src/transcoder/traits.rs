//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use super::error::TranscodeError;
use super::types::{EncodingProfile, MediaInfo, TranscodeReport};
use crate::artifact::Artifact;

/// Something that turns input bytes into an encoded artifact.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// The encoding every run produces.
    fn profile(&self) -> EncodingProfile {
        EncodingProfile::OPUS
    }

    /// Encodes `input` into the artifact's path and waits for the result.
    ///
    /// On `Ok` the artifact exists and is non-empty. On `Err` it may be
    /// partially written or absent.
    async fn transcode(
        &self,
        input: Bytes,
        artifact: &Artifact,
    ) -> Result<TranscodeReport, TranscodeError>;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
