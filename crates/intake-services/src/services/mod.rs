#[cfg(feature = "clamav")]
pub mod clamav;
pub mod reporter;
pub mod sanitizer;
pub mod scanner;

#[cfg(feature = "clamav")]
pub use clamav::ClamAVScanner;
pub use reporter::{ErrorReporter, MemoryErrorReporter, NoOpErrorReporter, TracingErrorReporter};
pub use sanitizer::{NameSanitizer, SafeNameSanitizer};
pub use scanner::{ContentScanner, ScanResult, ScannerChain, SignatureScanner};
