use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::Artifact;

/// Response body that reads an artifact and owns it.
///
/// The artifact is deleted when the stream is dropped, which happens after
/// the last chunk was sent or as soon as the client goes away.
pub struct ArtifactStream {
    // Declared first so the file handle closes before the artifact is removed.
    inner: ReaderStream<File>,
    artifact: Artifact,
    sent_bytes: u64,
    finished: bool,
}

impl ArtifactStream {
    /// Opens the artifact for reading. On error the artifact is dropped and
    /// therefore deleted.
    pub async fn open(artifact: Artifact) -> std::io::Result<Self> {
        let file = File::open(artifact.path()).await?;
        Ok(Self {
            inner: ReaderStream::new(file),
            artifact,
            sent_bytes: 0,
            finished: false,
        })
    }
}

impl Stream for ArtifactStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_next(cx);
        match &poll {
            Poll::Ready(Some(Ok(chunk))) => this.sent_bytes += chunk.len() as u64,
            Poll::Ready(None) => this.finished = true,
            _ => {}
        }
        poll
    }
}

impl Drop for ArtifactStream {
    fn drop(&mut self) {
        if self.finished {
            info!(
                artifact = %self.artifact.file_name(),
                bytes = self.sent_bytes,
                "Transfer complete"
            );
        } else {
            warn!(
                artifact = %self.artifact.file_name(),
                bytes = self.sent_bytes,
                "Transfer aborted before completion"
            );
        }
    }
}
