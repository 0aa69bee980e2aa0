//! Error message lookup
//!
//! Intake never reads a global locale table. Messages are resolved through a
//! [`MessageResolver`] handed to the pipeline, so hosts can plug in their own
//! localization while tests and the CLI use the built-in English catalog.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ErrorCode};

/// Resolves an error code to display text.
pub trait MessageResolver: Send + Sync {
    fn resolve(&self, code: ErrorCode) -> String;
}

/// Message table keyed by error code, with English fallbacks.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    overrides: HashMap<ErrorCode, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the message for a single code.
    pub fn with_message(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.overrides.insert(code, message.into());
        self
    }

    /// Build a catalog from a JSON object.
    ///
    /// Keys may be code names (`"FILE_EXT"`), numeric codes (`"2"`) or host locale
    /// keys (`"intake_ecode_2"`). Unknown keys are ignored with a warning.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut catalog = Self::new();

        for (key, message) in raw {
            let lookup = key.strip_prefix("intake_ecode_").unwrap_or(&key);
            match lookup.parse::<ErrorCode>() {
                Ok(code) => {
                    catalog.overrides.insert(code, message);
                }
                Err(_) => {
                    tracing::warn!(key = %key, "Ignoring unknown message catalog key");
                }
            }
        }

        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    fn default_message(code: ErrorCode) -> &'static str {
        match code {
            ErrorCode::FileName => "The file could not be moved to its destination",
            ErrorCode::FileExt => "This file extension is not allowed",
            ErrorCode::FileCheck => "The file content does not match its extension",
            ErrorCode::FileExists => "A file with this name already exists",
            ErrorCode::FileError => "The upload did not complete",
            ErrorCode::FileSize => "The file is too large",
        }
    }
}

impl MessageResolver for MessageCatalog {
    fn resolve(&self, code: ErrorCode) -> String {
        self.overrides
            .get(&code)
            .cloned()
            .unwrap_or_else(|| Self::default_message(code).to_string())
    }
}
