//! Delayed deletion of temporary media files
//!
//! Each scheduled file is tracked until it is deleted. Shutting the reaper
//! down wakes every waiting task and removes any file still tracked.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use super::MediaStore;

/// Delay between finishing with a file and deleting it
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_secs(5);

struct Inner {
    store: MediaStore,
    delay: Duration,
    tracked: Mutex<HashSet<PathBuf>>,
    shutdown: watch::Sender<bool>,
}

/// Tracks temporary files and deletes them after a delay
#[derive(Clone)]
pub struct TempFileReaper {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TempFileReaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempFileReaper")
            .field("delay", &self.inner.delay)
            .field("pending", &self.pending())
            .finish()
    }
}

impl TempFileReaper {
    /// Create a reaper deleting through `store` after `delay`
    #[must_use]
    pub fn new(store: MediaStore, delay: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                store,
                delay,
                tracked: Mutex::new(HashSet::new()),
                shutdown,
            }),
        }
    }

    fn tracked(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        self.inner
            .tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of files waiting for deletion
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracked().len()
    }

    /// Whether the reaper has been shut down
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Schedule `path` for deletion after the configured delay
    ///
    /// After shutdown the file is deleted right away.
    pub fn schedule(&self, path: PathBuf) {
        if !self.tracked().insert(path.clone()) {
            return;
        }

        let reaper = self.clone();
        let mut rx = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            if !*rx.borrow_and_update() {
                tokio::select! {
                    () = tokio::time::sleep(reaper.inner.delay) => {}
                    _ = rx.changed() => {}
                }
            }
            reaper.remove(&path).await;
        });
    }

    async fn remove(&self, path: &Path) {
        if !self.tracked().contains(path) {
            // Already handled by a shutdown flush
            return;
        }
        match self.inner.store.delete(path).await {
            Ok(true) => tracing::debug!(path = %path.display(), "temporary file deleted"),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete temporary file");
            }
        }
        self.tracked().remove(path);
    }

    /// Delete every tracked file now and stop delaying new ones
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);

        let paths: Vec<PathBuf> = self.tracked().iter().cloned().collect();
        let count = paths.len();
        for path in paths {
            self.remove(&path).await;
        }

        if count > 0 {
            tracing::info!(count, "flushed temporary files on shutdown");
        }
    }
}
