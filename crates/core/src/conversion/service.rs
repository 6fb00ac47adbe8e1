//! One conversion job, from request to finished artifact.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::error::ConversionError;
use super::types::ConvertedAudio;
use crate::acquire::{ConversionRequest, InputAcquirer};
use crate::artifact::ArtifactStore;
use crate::transcoder::{start_transcode, Transcoder};

/// Runs the acquire → transcode part of a job.
///
/// The job's states are `acquiring`, `transcoding` and, once the caller takes
/// the returned [`ConvertedAudio`], `streaming`. Each transition is logged
/// under the job's span. Nothing is retried.
#[derive(Clone)]
pub struct ConversionService {
    acquirer: InputAcquirer,
    transcoder: Arc<dyn Transcoder>,
    artifacts: ArtifactStore,
}

impl ConversionService {
    pub fn new(
        acquirer: InputAcquirer,
        transcoder: Arc<dyn Transcoder>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            acquirer,
            transcoder,
            artifacts,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Acquires the input and transcodes it into a fresh artifact.
    ///
    /// No artifact exists if acquisition fails. If transcoding fails the
    /// artifact remnant is deleted before this returns.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConvertedAudio, ConversionError> {
        let job_id = Uuid::new_v4();
        let source = request.kind();
        let span = info_span!("conversion", %job_id, source = source.as_str());

        async move {
            info!(state = "acquiring", "Acquiring input");
            let input = self.acquirer.acquire(request).await.map_err(|e| {
                warn!(state = "acquisition_failed", error = %e, "Could not acquire input");
                ConversionError::Acquisition(e)
            })?;

            let artifact = self.artifacts.allocate();
            info!(
                state = "transcoding",
                input = %input.source_name,
                input_bytes = input.bytes.len(),
                artifact = %artifact.file_name(),
                "Starting transcode"
            );

            let handle = start_transcode(Arc::clone(&self.transcoder), input.bytes, artifact);
            match handle.outcome().await {
                Ok(success) => {
                    info!(
                        state = "transcoded",
                        output_bytes = success.report.output_size_bytes,
                        duration_ms = success.report.duration_ms,
                        "Transcode finished"
                    );
                    Ok(ConvertedAudio {
                        job_id,
                        source,
                        source_name: input.source_name,
                        profile: self.transcoder.profile(),
                        report: success.report,
                        artifact: success.artifact,
                    })
                }
                Err(failure) => {
                    warn!(
                        state = "transcode_failed",
                        error = %failure.error,
                        "Transcode failed"
                    );
                    // Dropping the remnant deletes it.
                    drop(failure.artifact);
                    Err(ConversionError::Transcode(failure.error))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::{AcquireError, InputKind};
    use crate::testing::{MockFetcher, MockTranscoder};
    use crate::transcoder::TranscodeError;
    use bytes::Bytes;
    use std::collections::HashSet;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        fetcher: Arc<MockFetcher>,
        transcoder: Arc<MockTranscoder>,
        service: ConversionService,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let transcoder = Arc::new(MockTranscoder::new());
        let service = ConversionService::new(
            InputAcquirer::new(fetcher.clone()),
            transcoder.clone(),
            ArtifactStore::new(dir.path(), "opus"),
        );
        Harness {
            dir,
            fetcher,
            transcoder,
            service,
        }
    }

    fn files_in(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    fn upload(bytes: &'static [u8]) -> ConversionRequest {
        ConversionRequest::Upload {
            bytes: Bytes::from_static(bytes),
            source_name: "clip.wav".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_success_then_cleanup_on_drop() {
        let h = harness();

        let converted = h.service.convert(upload(b"RIFFdata")).await.unwrap();

        assert_eq!(converted.source, InputKind::Upload);
        assert!(converted.artifact.path().exists());
        assert_eq!(converted.metadata().mime_type, "audio/opus");
        assert_eq!(converted.metadata().extension, "opus");
        assert_eq!(files_in(&h.dir), 1);

        drop(converted);
        assert_eq!(files_in(&h.dir), 0);
        assert_eq!(h.service.artifacts().live_count(), 0);
    }

    #[tokio::test]
    async fn test_transcoder_receives_input_bytes() {
        let h = harness();

        let _converted = h.service.convert(upload(b"RIFFdata")).await.unwrap();

        let calls = h.transcoder.recorded_inputs().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(&calls[0][..], b"RIFFdata");
    }

    #[tokio::test]
    async fn test_acquisition_failure_skips_transcoder() {
        let h = harness();

        let err = h
            .service
            .convert(ConversionRequest::Url {
                location: "https://example/audio.mp3".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConversionError::Acquisition(AcquireError::Status { status: 404, .. })
        ));
        assert_eq!(h.transcoder.call_count().await, 0);
        assert_eq!(h.service.artifacts().live_count(), 0);
        assert_eq!(files_in(&h.dir), 0);
    }

    #[tokio::test]
    async fn test_url_success() {
        let h = harness();
        h.fetcher
            .set_response("https://example/audio.mp3", Bytes::from_static(b"ID3..."))
            .await;

        let converted = h
            .service
            .convert(ConversionRequest::Url {
                location: "https://example/audio.mp3".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(converted.source, InputKind::Url);
        assert_eq!(converted.source_name, "https://example/audio.mp3");
        assert_eq!(&h.transcoder.recorded_inputs().await[0][..], b"ID3...");
    }

    #[tokio::test]
    async fn test_transcode_failure_removes_partial_artifact() {
        let h = harness();
        h.transcoder.set_write_partial_on_error(true).await;
        h.transcoder
            .set_next_error(TranscodeError::failed("Invalid data found when processing input"))
            .await;

        let err = h.service.convert(upload(b"garbage")).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid data found when processing input");
        assert_eq!(files_in(&h.dir), 0);
        assert_eq!(h.service.artifacts().live_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_get_distinct_artifacts() {
        let h = harness();

        let jobs = (0..16u8).map(|i| {
            let service = h.service.clone();
            async move {
                service
                    .convert(ConversionRequest::Upload {
                        bytes: Bytes::from(vec![i; 64]),
                        source_name: format!("clip-{}.wav", i),
                    })
                    .await
                    .unwrap()
            }
        });
        let results = futures::future::join_all(jobs).await;

        let names: HashSet<String> = results.iter().map(|c| c.file_name().to_string()).collect();
        assert_eq!(names.len(), 16);
        for (i, converted) in results.iter().enumerate() {
            let content = std::fs::read(converted.artifact.path()).unwrap();
            assert_eq!(content, MockTranscoder::encode(&vec![i as u8; 64]));
        }

        drop(results);
        assert_eq!(files_in(&h.dir), 0);
    }
}
