//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use super::error::TranscodeError;
use crate::artifact::Artifact;

/// Fixed output encoding. Callers cannot negotiate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodingProfile {
    /// FFmpeg encoder name.
    pub codec: &'static str,
    pub bitrate_kbps: u32,
    /// Encoder threads; 0 lets ffmpeg use every available core.
    pub threads: u32,
    /// FFmpeg muxer name.
    pub format: &'static str,
    pub extension: &'static str,
    pub mime_type: &'static str,
}

impl EncodingProfile {
    pub const OPUS: Self = Self {
        codec: "libopus",
        bitrate_kbps: 128,
        threads: 0,
        format: "opus",
        extension: "opus",
        mime_type: "audio/opus",
    };

    /// Output-side ffmpeg arguments for this profile.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-vn".to_string(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-c:a".to_string(),
            self.codec.to_string(),
            "-b:a".to_string(),
            format!("{}k", self.bitrate_kbps),
            "-f".to_string(),
            self.format.to_string(),
        ]
    }
}

/// Statistics of a finished transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranscodeReport {
    pub output_size_bytes: u64,
    pub duration_ms: u64,
}

/// A transcode that fully wrote its artifact.
#[derive(Debug)]
pub struct TranscodeSuccess {
    pub artifact: Artifact,
    pub report: TranscodeReport,
}

/// A transcode that failed. Carries the artifact remnant, if the run got far
/// enough to own one, so dropping the failure cleans it up.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct TranscodeFailure {
    pub error: TranscodeError,
    pub artifact: Option<Artifact>,
}

/// Terminal result of one transcoder run. Exactly one per run.
pub type TranscodeOutcome = Result<TranscodeSuccess, TranscodeFailure>;

/// Information about a media file, as reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    /// Container, first entry of ffprobe's `format_name`.
    pub format: String,
    pub audio_codec: Option<String>,
    pub audio_bitrate_kbps: Option<u32>,
    pub audio_sample_rate: Option<u32>,
    pub audio_channels: Option<u8>,
}
