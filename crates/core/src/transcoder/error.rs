//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transcoding.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// FFmpeg rejected the input or failed while encoding. The message is
    /// what ffmpeg reported and is passed to the caller as is.
    #[error("{reason}")]
    Failed { reason: String },

    /// FFmpeg exited cleanly but left no usable output.
    #[error("Transcoder produced no output")]
    EmptyOutput,

    /// Conversion timed out.
    #[error("Transcoding timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error while talking to the process or the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transcoding task went away without reporting a result.
    #[error("Transcoding task terminated unexpectedly")]
    Aborted,
}

impl TranscodeError {
    /// Creates a new failed error.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }
}
