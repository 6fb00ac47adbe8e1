//! Mock implementations of the transcoder and fetcher seams.
//!
//! Lets the conversion pipeline and the HTTP API be exercised without ffmpeg
//! or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use opusgate_core::testing::{MockFetcher, MockTranscoder};
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! fetcher.set_response("https://cdn.example/a.mp3", Bytes::from_static(b"ID3")).await;
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! // Build a ConversionService from them...
//! ```

mod mock_fetcher;
mod mock_transcoder;

pub use mock_fetcher::MockFetcher;
pub use mock_transcoder::MockTranscoder;
