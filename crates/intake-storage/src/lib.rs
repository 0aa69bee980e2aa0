//! Intake Storage Library
//!
//! This crate provides the filesystem side of upload intake: the `UploadStore`
//! trait and its local implementation.
//!
//! # Verified uploads
//!
//! The host transport writes each upload into a spool directory before intake runs.
//! Only regular files resolving inside the spool are treated as verified uploads, and
//! only verified uploads are ever moved to a destination. Moves are renames; a
//! cross-device destination fails instead of falling back to a copy.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalUploadStore;
pub use traits::{StorageError, StorageResult, UploadStore};
