//! Mock transcoder for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::artifact::Artifact;
use crate::transcoder::{MediaInfo, TranscodeError, TranscodeReport, Transcoder};

/// Mock implementation of the Transcoder trait.
///
/// Writes [`MockTranscoder::encode`] of the input to the artifact instead of
/// running ffmpeg, so tests can check which bytes ended up where.
///
/// # Example
///
/// ```rust,ignore
/// use opusgate_core::testing::MockTranscoder;
///
/// let transcoder = Arc::new(MockTranscoder::new());
/// transcoder
///     .set_next_error(TranscodeError::failed("Invalid data found"))
///     .await;
///
/// // Run a conversion...
///
/// assert_eq!(transcoder.call_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    /// Input of every call, in order.
    inputs: Arc<RwLock<Vec<Bytes>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    /// Write a few bytes to the artifact before failing.
    write_partial_on_error: Arc<RwLock<bool>>,
    /// Simulated encode time.
    delay: Arc<RwLock<Duration>>,
    /// Panic inside `transcode`.
    panic: Arc<RwLock<bool>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self {
            inputs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            write_partial_on_error: Arc::new(RwLock::new(false)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            panic: Arc::new(RwLock::new(false)),
        }
    }

    /// The bytes a successful call writes for `input`.
    pub fn encode(input: &[u8]) -> Vec<u8> {
        let mut out = b"OggS".to_vec();
        out.extend_from_slice(input);
        out
    }

    pub async fn recorded_inputs(&self) -> Vec<Bytes> {
        self.inputs.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.inputs.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_write_partial_on_error(&self, enabled: bool) {
        *self.write_partial_on_error.write().await = enabled;
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    pub async fn set_panic(&self, enabled: bool) {
        *self.panic.write().await = enabled;
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        input: Bytes,
        artifact: &Artifact,
    ) -> Result<TranscodeReport, TranscodeError> {
        let started = Instant::now();
        self.inputs.write().await.push(input.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if *self.panic.read().await {
            panic!("mock transcoder panic");
        }

        if let Some(err) = self.next_error.write().await.take() {
            if *self.write_partial_on_error.read().await {
                tokio::fs::write(artifact.path(), b"OggS").await?;
            }
            return Err(err);
        }

        let encoded = Self::encode(&input);
        tokio::fs::write(artifact.path(), &encoded).await?;

        Ok(TranscodeReport {
            output_size_bytes: encoded.len() as u64,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        let size_bytes = tokio::fs::metadata(path).await?.len();
        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs: 1.0,
            format: "ogg".to_string(),
            audio_codec: Some("opus".to_string()),
            audio_bitrate_kbps: Some(128),
            audio_sample_rate: Some(48000),
            audio_channels: Some(2),
        })
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}
