//! Transcoder module: runs the external encoder.
//!
//! [`Transcoder`] is the seam; [`FfmpegTranscoder`] pipes the input bytes
//! into an ffmpeg child process and writes Opus into an
//! [`Artifact`](crate::artifact::Artifact). [`start_transcode`] runs it on its
//! own task and hands back a [`TranscodeHandle`] that resolves to exactly one
//! [`TranscodeOutcome`].
//!
//! # Example
//!
//! ```ignore
//! use opusgate_core::{start_transcode, ArtifactStore, FfmpegTranscoder};
//!
//! let transcoder = Arc::new(FfmpegTranscoder::with_defaults());
//! transcoder.validate().await?;
//!
//! let store = ArtifactStore::new("/tmp/opusgate", "opus");
//! let handle = start_transcode(transcoder, input_bytes, store.allocate());
//! match handle.outcome().await {
//!     Ok(success) => println!("{} bytes", success.report.output_size_bytes),
//!     Err(failure) => eprintln!("{}", failure.error),
//! }
//! ```

mod error;
mod ffmpeg;
mod handle;
mod traits;
mod types;

pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;
pub use handle::{start_transcode, TranscodeHandle};
pub use traits::Transcoder;
pub use types::{
    EncodingProfile, MediaInfo, TranscodeFailure, TranscodeOutcome, TranscodeReport,
    TranscodeSuccess,
};
