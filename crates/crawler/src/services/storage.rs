use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::models::{AssetClass, Subject};

/// Atomic counter for generating unique temp file suffixes
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// On-disk asset store.
///
/// Layout: `<root>/<class>/[<subject>/]<id>.<ext>`. A file's presence is the
/// only record that an asset was already discovered.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn class_dir(&self, class: AssetClass) -> PathBuf {
        self.root.join(class.as_str())
    }

    /// Deterministic local path for an identifier
    pub fn path_for(&self, class: AssetClass, subject: Option<&Subject>, id: &str) -> PathBuf {
        let mut path = self.class_dir(class);
        if class.has_subject_dir() {
            if let Some(subject) = subject {
                path.push(subject.as_str());
            }
        }
        path.push(format!("{}.{}", id, class.extension()));
        path
    }

    /// Whether `path` exists. An I/O error other than "not found" counts as
    /// present, so an unreadable file is never downloaded and announced
    /// again.
    pub async fn exists(&self, path: &Path) -> bool {
        match tokio::fs::try_exists(path).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(
                    "Cannot check {}, treating it as stored: {}",
                    path.display(),
                    e
                );
                true
            }
        }
    }

    /// Whether an identifier is already on disk, at its current path or
    /// under the class's legacy directory.
    pub async fn is_stored(
        &self,
        class: AssetClass,
        subject: Option<&Subject>,
        id: &str,
    ) -> bool {
        if self.exists(&self.path_for(class, subject, id)).await {
            return true;
        }
        match self.legacy_path_for(class, id) {
            Some(legacy) => self.exists(&legacy).await,
            None => false,
        }
    }

    fn legacy_path_for(&self, class: AssetClass, id: &str) -> Option<PathBuf> {
        let dir = class.legacy_dir()?;
        Some(self.root.join(dir).join(format!("{}.{}", id, class.extension())))
    }

    /// Creates the top-level directory of every class.
    pub async fn ensure_class_dirs(&self) -> Result<(), StorageError> {
        for class in AssetClass::ALL {
            let dir = self.class_dir(class);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| StorageError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Writes `bytes` to `path` through a temp file and rename, so a partial
    /// write never looks like a finished download.
    pub async fn save(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let tmp_path = path.with_extension(format!("tmp.{}", generate_temp_suffix()));

        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| StorageError::io(&tmp_path, e))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::io(path, e));
        }

        tracing::info!("Saved image to disk: {}", path.display());
        Ok(())
    }
}

fn generate_temp_suffix() -> String {
    let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{}.{}", counter, timestamp)
}
