//! Configuration module
//!
//! This module provides the process-wide intake configuration: default upload
//! directory, allowed extensions, the spool directory where the host transport
//! materializes uploads, and scanner settings. Per-call options are derived from it
//! (see [`UploadOptions::from_config`](crate::options::UploadOptions::from_config)).

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

// Common constants
const UPLOAD_PATH: &str = "datas/uploads";
const ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp,pdf,zip,tar.gz,txt";
const SPOOL_DIR_NAME: &str = "intake-spool";
const CLAMAV_PORT: u16 = 3310;
const CLAMAV_TIMEOUT_SECS: u64 = 30;

/// Intake configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub upload_path: String,
    pub spool_path: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_file_size_bytes: Option<u64>,
    pub use_safe_name: bool,
    pub use_content_check: bool,
    pub check_file_exists: bool,
    pub use_error_reporting: bool,
    pub messages_path: Option<PathBuf>,
    // ClamAV configuration
    pub clamav_enabled: bool,
    pub clamav_host: String,
    pub clamav_port: u16,
    pub clamav_fail_closed: bool,
    pub clamav_timeout_secs: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            upload_path: UPLOAD_PATH.to_string(),
            spool_path: env::temp_dir().join(SPOOL_DIR_NAME),
            allowed_extensions: parse_list(ALLOWED_EXTENSIONS),
            max_file_size_bytes: None,
            use_safe_name: true,
            use_content_check: true,
            check_file_exists: true,
            use_error_reporting: true,
            messages_path: None,
            clamav_enabled: false,
            clamav_host: "localhost".to_string(),
            clamav_port: CLAMAV_PORT,
            clamav_fail_closed: true,
            clamav_timeout_secs: CLAMAV_TIMEOUT_SECS,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let max_file_size_bytes = match env::var("INTAKE_MAX_FILE_SIZE_MB") {
            Ok(raw) => parse_size_mb("INTAKE_MAX_FILE_SIZE_MB", &raw)?,
            Err(_) => None,
        };

        let config = IntakeConfig {
            upload_path: env::var("INTAKE_UPLOAD_PATH").unwrap_or(defaults.upload_path),
            spool_path: env::var("INTAKE_SPOOL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.spool_path),
            allowed_extensions: env::var("INTAKE_ALLOWED_EXTENSIONS")
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.allowed_extensions),
            max_file_size_bytes,
            use_safe_name: env_bool("INTAKE_USE_SAFE_NAME", defaults.use_safe_name),
            use_content_check: env_bool("INTAKE_USE_CONTENT_CHECK", defaults.use_content_check),
            check_file_exists: env_bool("INTAKE_CHECK_FILE_EXISTS", defaults.check_file_exists),
            use_error_reporting: env_bool(
                "INTAKE_USE_ERROR_REPORTING",
                defaults.use_error_reporting,
            ),
            messages_path: env::var("INTAKE_MESSAGES_PATH").ok().map(PathBuf::from),
            clamav_enabled: env_bool("CLAMAV_ENABLED", defaults.clamav_enabled),
            clamav_host: env::var("CLAMAV_HOST").unwrap_or(defaults.clamav_host),
            clamav_port: env::var("CLAMAV_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clamav_port),
            clamav_fail_closed: env_bool("CLAMAV_FAIL_CLOSED", defaults.clamav_fail_closed),
            clamav_timeout_secs: env::var("CLAMAV_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clamav_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_path.trim().is_empty() {
            return Err(ConfigError::Invalid("upload path must not be empty".to_string()));
        }

        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one allowed extension is required".to_string(),
            ));
        }

        if self.clamav_enabled && self.clamav_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "CLAMAV_HOST must be set when ClamAV is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a size given in MiB into bytes; blank means unset.
pub fn parse_size_mb(name: &'static str, raw: &str) -> Result<Option<u64>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u64>()
        .ok()
        .and_then(|mb| mb.checked_mul(1024 * 1024))
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        })
}

/// Split a comma-separated list, trimming and lowercasing entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
