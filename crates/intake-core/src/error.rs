//! Error types module
//!
//! This module provides the error-code taxonomy reported by upload intake and the
//! infrastructure error types shared across intake components.
//!
//! Intake failures are *data*: every policy, content, size, transport or relocation
//! problem is an [`ErrorCode`] recorded into a per-request report. The `thiserror`
//! enums below are reserved for problems with the intake service itself
//! (configuration, message catalogs).

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected uploads worth an operator's attention
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Error codes produced by upload validation and relocation.
///
/// Numeric values are stable and shared with host locale tables
/// (see [`ErrorCode::message_key`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Moving the upload to its destination failed.
    FileName,
    /// Extension is not in the allow-list.
    FileExt,
    /// Content scanner rejected the file.
    FileCheck,
    /// Destination already exists.
    FileExists,
    /// Transport layer reported a non-zero error code.
    FileError,
    /// File exceeds the configured maximum size.
    FileSize,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::FileName,
        ErrorCode::FileExt,
        ErrorCode::FileCheck,
        ErrorCode::FileExists,
        ErrorCode::FileError,
        ErrorCode::FileSize,
    ];

    /// Numeric code
    pub fn code(self) -> u8 {
        match self {
            ErrorCode::FileName => 1,
            ErrorCode::FileExt => 2,
            ErrorCode::FileCheck => 3,
            ErrorCode::FileExists => 4,
            ErrorCode::FileError => 5,
            ErrorCode::FileSize => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Machine-readable error code (e.g., "FILE_EXT")
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::FileName => "FILE_NAME",
            ErrorCode::FileExt => "FILE_EXT",
            ErrorCode::FileCheck => "FILE_CHECK",
            ErrorCode::FileExists => "FILE_EXISTS",
            ErrorCode::FileError => "FILE_ERROR",
            ErrorCode::FileSize => "FILE_SIZE",
        }
    }

    /// Key used to look the message up in a host locale table.
    pub fn message_key(self) -> String {
        format!("intake_ecode_{}", self.code())
    }

    /// Log level for this error
    pub fn log_level(self) -> LogLevel {
        match self {
            ErrorCode::FileName => LogLevel::Error,
            ErrorCode::FileCheck | ErrorCode::FileError => LogLevel::Warn,
            ErrorCode::FileExt | ErrorCode::FileExists | ErrorCode::FileSize => LogLevel::Debug,
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        if let Some(code) = Self::ALL.into_iter().find(|c| c.as_str() == upper) {
            return Ok(code);
        }
        upper
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| ConfigError::UnknownErrorCode(s.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown error code: {0}")]
    UnknownErrorCode(String),

    #[error("Failed to load message catalog: {0}")]
    MessageCatalog(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_are_stable() {
        let codes: Vec<u8> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("FILE_EXT".parse::<ErrorCode>().unwrap(), ErrorCode::FileExt);
        assert_eq!("file_size".parse::<ErrorCode>().unwrap(), ErrorCode::FileSize);
        assert_eq!("4".parse::<ErrorCode>().unwrap(), ErrorCode::FileExists);
        assert!("7".parse::<ErrorCode>().is_err());
        assert!("FILE_BOGUS".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn unknown_code_is_a_typed_error() {
        match "FILE_BOGUS".parse::<ErrorCode>() {
            Err(ConfigError::UnknownErrorCode(raw)) => assert_eq!(raw, "FILE_BOGUS"),
            other => panic!("unexpected parse result: {:?}", other),
        }
    }

    #[test]
    fn message_key_uses_numeric_code() {
        assert_eq!(ErrorCode::FileCheck.message_key(), "intake_ecode_3");
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::FileExists).unwrap();
        assert_eq!(json, "\"FILE_EXISTS\"");
    }
}
