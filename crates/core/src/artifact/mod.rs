//! Transient output files.
//!
//! Every transcode writes into an [`Artifact`]: a uniquely named file under
//! the store directory that is deleted when the guard is dropped. Ownership of
//! the guard follows the job (transcoder task, then response body), so the
//! file goes away on every exit path, including client disconnects.

mod stream;

pub use stream::ArtifactStream;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Allocates artifacts inside one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    extension: &'static str,
    live: Arc<AtomicUsize>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            dir: dir.into(),
            extension,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the store directory if needed.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Reserves a fresh name. Nothing is written to disk yet.
    ///
    /// The millisecond timestamp keeps names sortable; the UUID keeps jobs
    /// started within the same millisecond apart.
    pub fn allocate(&self) -> Artifact {
        let file_name = format!(
            "output-{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.extension
        );
        self.live.fetch_add(1, Ordering::Relaxed);
        Artifact {
            path: self.dir.join(&file_name),
            file_name,
            live: Some(Arc::clone(&self.live)),
        }
    }

    /// Number of artifacts allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

/// Scoped handle to one transient file. Dropping it deletes the file.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    file_name: String,
    /// `None` once released.
    live: Option<Arc<AtomicUsize>>,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_released(&self) -> bool {
        self.live.is_none()
    }

    /// Deletes the file. Only the first call does anything.
    ///
    /// Returns `true` if a file was actually removed. A missing file is not
    /// an error; any other failure is logged and swallowed.
    pub fn release(&mut self) -> bool {
        let Some(live) = self.live.take() else {
            return false;
        };
        live.fetch_sub(1, Ordering::Relaxed);

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(artifact = %self.file_name, "Deleted artifact");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(artifact = %self.file_name, "Artifact was never written");
                false
            }
            Err(e) => {
                warn!(
                    artifact = %self.file_name,
                    error = %e,
                    "Failed to delete artifact"
                );
                false
            }
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        self.release();
    }
}
