use std::path::Path;

use anyhow::Context;
use clap::Args;
use intake_core::OptionOverrides;

/// Per-upload option flags shared by CLI commands.
///
/// The CLI registers no custom validators, so there is no flag to select one; a
/// `custom_validator` set in the options file falls back to the default validator.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// JSON file with option overrides; flags take precedence over it
    #[arg(long)]
    pub options: Option<std::path::PathBuf>,
    /// Destination directory
    #[arg(long)]
    pub upload_path: Option<String>,
    /// Allowed extensions, comma separated (e.g. "png,jpg,tar.gz")
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,
    /// Maximum size in bytes
    #[arg(long)]
    pub max_size: Option<u64>,
    /// Remove any configured size limit
    #[arg(long, conflicts_with = "max_size")]
    pub no_max_size: bool,
    /// Prefix prepended to the stored filename
    #[arg(long)]
    pub prefix: Option<String>,
    #[arg(long)]
    pub no_safe_name: bool,
    #[arg(long)]
    pub no_content_check: bool,
    #[arg(long)]
    pub no_exists_check: bool,
    #[arg(long)]
    pub no_error_reporting: bool,
}

impl OverrideArgs {
    /// Resolve the overrides file (if any) and apply the flags on top.
    pub fn into_overrides(self) -> anyhow::Result<OptionOverrides> {
        let mut overrides = match &self.options {
            Some(path) => load_overrides(path)?,
            None => OptionOverrides::default(),
        };

        if self.upload_path.is_some() {
            overrides.upload_path = self.upload_path;
        }
        if self.extensions.is_some() {
            overrides.valid_extensions = self.extensions;
        }
        if self.max_size.is_some() {
            overrides.max_size = Some(self.max_size);
        }
        if self.no_max_size {
            overrides.max_size = Some(None);
        }
        if self.prefix.is_some() {
            overrides.name_prefix = self.prefix;
        }
        if self.no_safe_name {
            overrides.use_safe_name = Some(false);
        }
        if self.no_content_check {
            overrides.use_content_check = Some(false);
        }
        if self.no_exists_check {
            overrides.check_file_exists = Some(false);
        }
        if self.no_error_reporting {
            overrides.use_error_reporting = Some(false);
        }

        Ok(overrides)
    }
}

/// Read option overrides from a JSON file.
pub fn load_overrides(path: &Path) -> anyhow::Result<OptionOverrides> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid options file {}", path.display()))
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout carries only the JSON result.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
