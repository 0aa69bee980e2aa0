//! Intake Services Layer
//!
//! This crate hosts the collaborators the intake pipeline calls into: content
//! scanners (signature checks, ClamAV), the safe-name sanitizer and the host
//! error-reporting hooks. Each is a trait with default implementations so hosts
//! can swap in their own.

pub mod services;

use std::sync::Arc;

use intake_core::IntakeConfig;

#[cfg(feature = "clamav")]
pub use services::clamav::ClamAVScanner;
pub use services::{
    ContentScanner, ErrorReporter, MemoryErrorReporter, NameSanitizer, NoOpErrorReporter,
    SafeNameSanitizer, ScanResult, ScannerChain, SignatureScanner, TracingErrorReporter,
};

/// Build the content scanner described by `config`.
///
/// Signature checks always run; ClamAV is appended when enabled and compiled in.
pub fn scanner_from_config(config: &IntakeConfig) -> Arc<dyn ContentScanner> {
    let chain = ScannerChain::new().with(Arc::new(SignatureScanner::new()));

    #[cfg(feature = "clamav")]
    let chain = if config.clamav_enabled {
        tracing::info!(
            host = %config.clamav_host,
            port = config.clamav_port,
            fail_closed = config.clamav_fail_closed,
            "ClamAV scanning enabled"
        );
        chain.with(Arc::new(ClamAVScanner::with_timeout(
            config.clamav_host.clone(),
            config.clamav_port,
            config.clamav_fail_closed,
            config.clamav_timeout_secs,
        )))
    } else {
        chain
    };

    if cfg!(not(feature = "clamav")) && config.clamav_enabled {
        tracing::warn!("CLAMAV_ENABLED is set but the clamav feature is not compiled in");
    }

    Arc::new(chain)
}
