//! Asynchronous invocation with a single terminal outcome.

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{TranscodeFailure, TranscodeOutcome, TranscodeSuccess};
use crate::artifact::Artifact;

/// Pending result of a transcoder run started with [`start_transcode`].
///
/// Dropping the handle cancels the run: the transcoder future is dropped
/// (which kills ffmpeg) and the artifact is deleted.
#[derive(Debug)]
pub struct TranscodeHandle {
    rx: oneshot::Receiver<TranscodeOutcome>,
}

impl TranscodeHandle {
    /// Waits for the run to finish.
    pub async fn outcome(self) -> TranscodeOutcome {
        match self.rx.await {
            Ok(outcome) => outcome,
            // The task panicked or was torn down with the runtime. Its
            // artifact was dropped during unwinding.
            Err(_) => Err(TranscodeFailure {
                error: TranscodeError::Aborted,
                artifact: None,
            }),
        }
    }
}

/// Starts a transcode on its own task and returns immediately.
///
/// The artifact moves into the task and comes back inside the outcome. The
/// oneshot sender is consumed by its single `send`, so a run can report at
/// most once; a task that dies without sending surfaces as `Aborted`.
pub fn start_transcode(
    transcoder: Arc<dyn Transcoder>,
    input: Bytes,
    artifact: Artifact,
) -> TranscodeHandle {
    let (mut tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = tokio::select! {
            result = transcoder.transcode(input, &artifact) => result,
            _ = tx.closed() => {
                debug!(
                    artifact = %artifact.file_name(),
                    "Transcode abandoned by caller"
                );
                return;
            }
        };

        let outcome = match result {
            Ok(report) => Ok(TranscodeSuccess { artifact, report }),
            Err(error) => Err(TranscodeFailure {
                error,
                artifact: Some(artifact),
            }),
        };

        if tx.send(outcome).is_err() {
            debug!("Transcode finished after caller left, discarding artifact");
        }
    });

    TranscodeHandle { rx }
}
