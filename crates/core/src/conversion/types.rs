use serde::Serialize;
use uuid::Uuid;

use crate::acquire::InputKind;
use crate::artifact::{Artifact, ArtifactStream};
use crate::transcoder::{EncodingProfile, TranscodeReport};

/// A finished conversion. Owns its artifact until streamed or dropped.
#[derive(Debug)]
pub struct ConvertedAudio {
    pub job_id: Uuid,
    pub source: InputKind,
    pub source_name: String,
    pub profile: EncodingProfile,
    pub report: TranscodeReport,
    pub artifact: Artifact,
}

/// Description of a converted file, for the metadata response mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMetadata {
    pub file_name: String,
    pub extension: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl ConvertedAudio {
    pub fn file_name(&self) -> &str {
        self.artifact.file_name()
    }

    pub fn metadata(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            file_name: self.artifact.file_name().to_string(),
            extension: self.profile.extension.to_string(),
            mime_type: self.profile.mime_type.to_string(),
            size_bytes: self.report.output_size_bytes,
        }
    }

    /// Opens the artifact as a body stream that deletes it when done.
    pub async fn into_stream(self) -> std::io::Result<ArtifactStream> {
        ArtifactStream::open(self.artifact).await
    }
}
