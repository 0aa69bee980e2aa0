//! Upload records: what the host hands over and what intake produces.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::files::{extract_extension, safe_basename, strip_slashes};
use crate::report::ErrorReport;

/// Transport error code meaning "no error".
pub const UPLOAD_ERR_OK: i32 = 0;

/// A file materialized by the host transport, before intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedFile {
    /// Filename as sent by the client.
    pub name: String,
    /// Size reported by the transport, in bytes.
    pub size: u64,
    /// Where the transport stored the upload.
    pub tmp_name: PathBuf,
    /// Transport error code, [`UPLOAD_ERR_OK`] on success.
    #[serde(default)]
    pub error: i32,
}

/// Submitted files keyed by form field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedFiles(HashMap<String, SubmittedFile>);

impl SubmittedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, file: SubmittedFile) {
        self.0.insert(field.into(), file);
    }

    pub fn with(mut self, field: impl Into<String>, file: SubmittedFile) -> Self {
        self.insert(field, file);
        self
    }

    pub fn get(&self, field: &str) -> Option<&SubmittedFile> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// File metadata derived once per intake call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Stored filename (possibly sanitized and prefixed).
    pub name: String,
    /// Size reported by the transport, in bytes.
    pub size: u64,
    /// Destination directory, with trailing `/`.
    pub path: String,
    /// Lowercased extension of the client filename.
    pub extension: Option<String>,
    pub tmp_name: PathBuf,
    /// Transport error code.
    pub error: i32,
    /// Full destination path: `path` + `name`.
    pub upload_path: String,
}

impl FileRecord {
    /// Build a record from a submitted entry. `upload_dir` must already be normalized.
    pub fn from_submitted(file: &SubmittedFile, upload_dir: &str) -> Self {
        let name = safe_basename(&strip_slashes(&file.name)).trim().to_string();
        let upload_path = format!("{}{}", upload_dir, name);

        Self {
            name,
            size: file.size,
            path: upload_dir.to_string(),
            extension: extract_extension(&file.name),
            tmp_name: file.tmp_name.clone(),
            error: file.error,
            upload_path,
        }
    }

    /// Replace the stored name and recompute the destination path.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.upload_path = format!("{}{}", self.path, self.name);
    }
}

/// Outcome of one intake call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeResult {
    Success { file: FileRecord },
    Failure { errors: ErrorReport },
}

impl IntakeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, IntakeResult::Success { .. })
    }

    pub fn file(&self) -> Option<&FileRecord> {
        match self {
            IntakeResult::Success { file } => Some(file),
            IntakeResult::Failure { .. } => None,
        }
    }

    /// Ordered `(code, message)` pairs; empty on success.
    pub fn errors(&self) -> &[(ErrorCode, String)] {
        match self {
            IntakeResult::Success { .. } => &[],
            IntakeResult::Failure { errors } => errors.list_errors(),
        }
    }

    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.errors().iter().map(|(c, _)| *c).collect()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors().iter().map(|(_, m)| m.clone()).collect()
    }
}

// Host-facing shape: `{success, file}` or `{success, errors, error_codes, error_messages}`.
impl Serialize for IntakeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IntakeResult::Success { file } => {
                let mut state = serializer.serialize_struct("IntakeResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("file", file)?;
                state.end()
            }
            IntakeResult::Failure { errors } => {
                let mut state = serializer.serialize_struct("IntakeResult", 4)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", errors)?;
                state.serialize_field("error_codes", &errors.codes())?;
                state.serialize_field("error_messages", &errors.messages())?;
                state.end()
            }
        }
    }
}
