//! Intake Core Library
//!
//! This crate provides the domain types shared across intake components: the
//! configuration and per-upload options, upload records, the error-code taxonomy
//! with its per-request report, message lookup, and filename helpers.

pub mod config;
pub mod error;
pub mod files;
pub mod messages;
pub mod options;
pub mod report;
pub mod upload;

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{ConfigError, ErrorCode, LogLevel};
pub use files::{extract_extension, remove_file, safe_basename};
pub use messages::{MessageCatalog, MessageResolver};
pub use options::{normalize_upload_path, OptionOverrides, UploadOptions};
pub use report::ErrorReport;
pub use upload::{FileRecord, IntakeResult, SubmittedFile, SubmittedFiles, UPLOAD_ERR_OK};
