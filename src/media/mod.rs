//! Local storage for downloaded media
//!
//! Files fetched from the platform are written to the upload directory, read
//! back for the AI call and removed by the [`TempFileReaper`].

mod reaper;

pub use reaper::{TempFileReaper, DEFAULT_DELETE_DELAY};

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rand::Rng;

use crate::Result;

/// Age after which orphaned uploads are swept at startup
pub const STALE_UPLOAD_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build a collision-resistant file name
///
/// Format: `YYYYMMDD_HHMMSS_<6 random base36>_<base><ext>`. Characters in
/// `base` outside `[A-Za-z0-9_-]` are replaced with `_`.
#[must_use]
pub fn generate_file_name(base: &str, ext: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    let base: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{stamp}_{suffix}_{base}{ext}")
}

/// Upload directory handle
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Create a store rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Upload directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `data` under `file_name` and return the full path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub async fn save(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), size = data.len(), "media saved");
        Ok(path)
    }

    /// Read a saved file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }

    /// Delete a file, returning `false` if it was already gone
    ///
    /// # Errors
    ///
    /// Returns error for failures other than a missing file
    pub async fn delete(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete regular files last modified more than `max_age` ago
    ///
    /// Returns the number of files removed. A missing directory counts as empty.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed
    pub async fn cleanup_older_than(&self, max_age: Duration) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut deleted = 0;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let age = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age < max_age {
                continue;
            }

            let path = entry.path();
            match self.delete(&path).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete stale upload");
                }
            }
        }

        if deleted > 0 {
            tracing::info!(deleted, dir = %self.dir.display(), "stale uploads removed");
        }
        Ok(deleted)
    }
}
