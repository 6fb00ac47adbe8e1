use thiserror::Error;

use crate::acquire::{AcquireError, InputKind};
use crate::transcoder::TranscodeError;

/// Terminal failure of one conversion job.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The request did not carry the expected input field.
    #[error("{}", missing_input_message(.0))]
    MissingInput(InputKind),

    /// The remote input could not be downloaded.
    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] AcquireError),

    /// The transcoder reported an error.
    #[error("{0}")]
    Transcode(#[from] TranscodeError),

    /// The finished artifact could not be opened for streaming.
    #[error("Failed to read converted file: {0}")]
    Io(#[from] std::io::Error),
}

fn missing_input_message(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::Upload => "No file uploaded.",
        InputKind::Url => "No URL provided.",
    }
}

impl ConversionError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }

    /// Label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "missing_input",
            Self::Acquisition(_) => "acquisition_failed",
            Self::Transcode(_) => "transcode_failed",
            Self::Io(_) => "io_error",
        }
    }
}
