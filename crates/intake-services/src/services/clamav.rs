use async_trait::async_trait;
use clamav_client::{clean, Tcp};
use std::path::Path;
use std::str;
use std::time::{Duration, Instant};

use super::scanner::{ContentScanner, ScanResult};

#[derive(Clone, Debug)]
pub struct ClamAVScanner {
    host: String,
    port: u16,
    fail_closed: bool,
    /// Timeout in seconds for each scan operation (default: 30)
    timeout_secs: u64,
}

impl ClamAVScanner {
    /// Create a new ClamAVScanner.
    ///
    /// # Arguments
    /// * `host` - ClamAV daemon hostname
    /// * `port` - ClamAV daemon port (typically 3310)
    /// * `fail_closed` - If true, treat scan failures/timeouts as errors; if false, allow (fail-open)
    pub fn new(host: String, port: u16, fail_closed: bool) -> Self {
        Self::with_timeout(host, port, fail_closed, 30)
    }

    /// Create with a custom scan timeout (for large files or slow ClamAV instances).
    pub fn with_timeout(host: String, port: u16, fail_closed: bool, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            fail_closed,
            timeout_secs,
        }
    }

    fn unavailable(&self, error_msg: String) -> ScanResult {
        if self.fail_closed {
            ScanResult::Error(error_msg)
        } else {
            tracing::warn!(error = %error_msg, "ClamAV unavailable, continuing (fail-open)");
            ScanResult::Clean
        }
    }

    /// Scan in-memory data using sync API inside spawn_blocking to avoid !Send tokio futures.
    pub async fn scan_bytes(&self, data: Vec<u8>) -> ScanResult {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = %self.port, "Starting ClamAV scan");
        let address = format!("{}:{}", self.host, self.port);

        let result = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            tokio::task::spawn_blocking(move || {
                let connection = Tcp {
                    host_address: address.as_str(),
                };
                clamav_client::scan_buffer(data.as_slice(), connection, None)
            }),
        )
        .await;

        let response_bytes = match result {
            Ok(Ok(Ok(bytes))) => bytes,
            Ok(Ok(Err(e))) => {
                tracing::error!(error = %e, "ClamAV scan failed");
                return self.unavailable(format!("ClamAV scan error: {}", e));
            }
            Ok(Err(e)) => {
                let error_msg = format!("ClamAV scan task join error: {}", e);
                tracing::error!(error = %error_msg, "ClamAV scan panicked");
                return ScanResult::Error(error_msg);
            }
            Err(_) => {
                let error_msg =
                    format!("ClamAV scan timeout (exceeded {} seconds)", self.timeout_secs);
                tracing::error!(error = %error_msg, "ClamAV scan timeout");
                return self.unavailable(error_msg);
            }
        };

        match clean(&response_bytes) {
            Ok(true) => {
                tracing::info!(
                    duration_ms = start.elapsed().as_millis(),
                    "File scan completed: clean"
                );
                ScanResult::Clean
            }
            Ok(false) => {
                let virus_name = parse_virus_name(&response_bytes);
                tracing::warn!(
                    duration_ms = start.elapsed().as_millis(),
                    virus = %virus_name,
                    "File scan detected virus"
                );
                ScanResult::Rejected(virus_name)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse ClamAV response");
                self.unavailable(format!("Failed to parse ClamAV response: {}", e))
            }
        }
    }
}

/// Extract the signature name from a `stream: <name> FOUND` response.
fn parse_virus_name(response_bytes: &[u8]) -> String {
    let response_str = match str::from_utf8(response_bytes) {
        Ok(s) => s.trim(),
        Err(_) => return "unknown".to_string(),
    };

    if !response_str.contains("FOUND") {
        return "unknown".to_string();
    }

    response_str
        .split(':')
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl ContentScanner for ClamAVScanner {
    async fn scan(&self, path: &Path, name: &str, _extension: Option<&str>) -> ScanResult {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read file for ClamAV scan");
                return ScanResult::Error(format!("Failed to read {}: {}", path.display(), e));
            }
        };

        let result = self.scan_bytes(data).await;
        if let ScanResult::Rejected(virus) = &result {
            tracing::warn!(filename = %name, virus = %virus, "Rejected infected upload");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamav_constructors() {
        let _svc = ClamAVScanner::new("localhost".to_string(), 3310, true);
        let _svc_custom = ClamAVScanner::with_timeout("localhost".to_string(), 3310, false, 60);
    }

    #[test]
    fn parses_virus_name_from_found_response() {
        assert_eq!(
            parse_virus_name(b"stream: Eicar-Test-Signature FOUND\0"),
            "Eicar-Test-Signature"
        );
        assert_eq!(parse_virus_name(b"stream: OK\0"), "unknown");
        assert_eq!(parse_virus_name(&[0xFF, 0xFE]), "unknown");
    }

    #[tokio::test]
    async fn fail_open_treats_unreachable_daemon_as_clean() {
        // Port 1 on localhost refuses connections.
        let scanner = ClamAVScanner::with_timeout("127.0.0.1".to_string(), 1, false, 5);
        assert_eq!(scanner.scan_bytes(b"data".to_vec()).await, ScanResult::Clean);
    }

    #[tokio::test]
    async fn fail_closed_treats_unreachable_daemon_as_error() {
        let scanner = ClamAVScanner::with_timeout("127.0.0.1".to_string(), 1, true, 5);
        assert!(matches!(
            scanner.scan_bytes(b"data".to_vec()).await,
            ScanResult::Error(_)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires a running ClamAV daemon on localhost:3310
    async fn detects_eicar_signature() {
        let eicar = br"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";
        let scanner = ClamAVScanner::new("localhost".to_string(), 3310, true);
        assert!(matches!(
            scanner.scan_bytes(eicar.to_vec()).await,
            ScanResult::Rejected(_)
        ));
    }
}
