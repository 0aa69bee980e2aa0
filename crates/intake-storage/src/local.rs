use crate::traits::{StorageError, StorageResult, UploadStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem upload store
///
/// Uploads are verified against a spool directory: only regular files located
/// directly or transitively under the spool count as transport-produced.
#[derive(Clone, Debug)]
pub struct LocalUploadStore {
    spool_path: PathBuf,
}

impl LocalUploadStore {
    /// Create a new LocalUploadStore instance
    ///
    /// # Arguments
    /// * `spool_path` - Directory where the host transport writes uploads (e.g., "/var/lib/intake/spool")
    pub async fn new(spool_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let spool_path = spool_path.into();

        fs::create_dir_all(&spool_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create spool directory {}: {}",
                spool_path.display(),
                e
            ))
        })?;

        let spool_path = spool_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve spool directory {}: {}",
                spool_path.display(),
                e
            ))
        })?;

        Ok(LocalUploadStore { spool_path })
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    /// Write `data` into the spool under a fresh name, as the transport would.
    pub async fn stage_bytes(&self, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.spool_path.join(format!("upload-{}", Uuid::new_v4()));

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            "Staged upload in spool"
        );

        Ok(path)
    }

    /// Copy an existing file into the spool.
    pub async fn stage_file(&self, source: &Path) -> StorageResult<PathBuf> {
        if !fs::try_exists(source).await.unwrap_or(false) {
            return Err(StorageError::NotFound(source.display().to_string()));
        }

        let path = self.spool_path.join(format!("upload-{}", Uuid::new_v4()));
        fs::copy(source, &path).await?;

        tracing::debug!(
            source = %source.display(),
            path = %path.display(),
            "Staged file in spool"
        );

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn file_size(&self, path: &Path) -> Option<u64> {
        fs::metadata(path)
            .await
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }

    async fn is_verified_upload(&self, path: &Path) -> bool {
        // Symlinks could point outside the spool.
        match fs::symlink_metadata(path).await {
            Ok(meta) if meta.file_type().is_file() => {}
            _ => return false,
        }

        match fs::canonicalize(path).await {
            Ok(canonical) => canonical.strip_prefix(&self.spool_path).is_ok(),
            Err(_) => false,
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn move_verified_upload(&self, source: &Path, destination: &Path) -> StorageResult<()> {
        if !self.is_verified_upload(source).await {
            return Err(StorageError::NotVerified(source.display().to_string()));
        }

        self.ensure_parent_dir(destination).await?;

        let start = std::time::Instant::now();

        fs::rename(source, destination).await.map_err(|e| {
            StorageError::MoveFailed(format!(
                "Failed to move {} to {}: {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Moved upload into place"
        );

        Ok(())
    }

    async fn remove(&self, path: &Path) -> bool {
        let path = path.to_path_buf();
        match tokio::task::spawn_blocking(move || intake_core::remove_file(&path)).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "Remove task failed");
                false
            }
        }
    }
}
