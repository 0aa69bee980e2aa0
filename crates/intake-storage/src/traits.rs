//! Upload store abstraction
//!
//! This module defines the filesystem operations intake needs: measuring and
//! verifying transport-produced temp files, checking destinations and moving
//! accepted uploads into place.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not a verified upload: {0}")]
    NotVerified(String),

    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Filesystem capability used by the intake pipeline.
///
/// A *verified upload* is a file the host transport produced for the current
/// request; only verified uploads may be moved to a destination.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Size of the file on disk, or `None` if it cannot be measured.
    async fn file_size(&self, path: &Path) -> Option<u64>;

    /// Whether `path` is a regular file produced by the upload transport.
    async fn is_verified_upload(&self, path: &Path) -> bool;

    /// Whether anything exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Rename a verified upload to `destination`.
    ///
    /// Implementations must move, never copy: on success the source no longer exists.
    async fn move_verified_upload(&self, source: &Path, destination: &Path) -> StorageResult<()>;

    /// Delete the file at `path`; returns whether a file was removed.
    async fn remove(&self, path: &Path) -> bool;
}
