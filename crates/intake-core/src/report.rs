//! Per-request error accumulation.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ErrorCode;
use crate::messages::MessageResolver;

/// Ordered `(code, message)` pairs collected while handling one upload.
///
/// Codes are deduplicated: recording a code twice replaces its message but keeps
/// the position of the first recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    entries: Vec<(ErrorCode, String)>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code`, resolving its message through `messages`.
    pub fn record_error(&mut self, code: ErrorCode, messages: &dyn MessageResolver) {
        self.insert(code, messages.resolve(code));
    }

    /// Record `code` with an explicit message.
    pub fn insert(&mut self, code: ErrorCode, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((code, message)),
        }
    }

    pub fn list_errors(&self) -> &[(ErrorCode, String)] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.entries.iter().any(|(c, _)| *c == code)
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object keyed by code name, in recording order.
impl Serialize for ErrorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, message) in &self.entries {
            map.serialize_entry(code.as_str(), message)?;
        }
        map.end()
    }
}
