//! Host error-reporting hooks
//!
//! Failed uploads can forward their messages to whatever displays errors in the
//! host (form error lists, flash messages). The host implements [`ErrorReporter`];
//! the implementations here cover logging, tests and disabled reporting.

use intake_core::{ErrorCode, LogLevel};
use std::sync::Mutex;

/// Receives error messages for display by the host.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, code: ErrorCode, message: &str);
}

/// Logs each reported error through `tracing`, at the code's log level.
#[derive(Debug, Clone, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, code: ErrorCode, message: &str) {
        match code.log_level() {
            LogLevel::Debug => tracing::debug!(code = %code, message = %message, "Upload rejected"),
            LogLevel::Warn => tracing::warn!(code = %code, message = %message, "Upload rejected"),
            LogLevel::Error => tracing::error!(code = %code, message = %message, "Upload failed"),
        }
    }
}

/// No-op implementation for when error reporting is disabled
#[derive(Debug, Clone, Default)]
pub struct NoOpErrorReporter;

impl ErrorReporter for NoOpErrorReporter {
    fn report(&self, _code: ErrorCode, _message: &str) {}
}

/// Keeps reported messages in memory until the host drains them.
#[derive(Debug, Default)]
pub struct MemoryErrorReporter {
    messages: Mutex<Vec<(ErrorCode, String)>>,
}

impl MemoryErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything reported so far.
    pub fn take(&self) -> Vec<(ErrorCode, String)> {
        match self.messages.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ErrorReporter for MemoryErrorReporter {
    fn report(&self, code: ErrorCode, message: &str) {
        let entry = (code, message.to_string());
        match self.messages.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
