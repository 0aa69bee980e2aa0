//! Per-upload options.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::IntakeConfig;

/// Options applied to a single upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOptions {
    /// Forward error messages to the host error reporter.
    pub use_error_reporting: bool,
    /// Rewrite the filename through the name sanitizer.
    pub use_safe_name: bool,
    /// Run the content scanner.
    pub use_content_check: bool,
    /// Destination directory. Always ends with `/` once normalized.
    pub upload_path: String,
    /// Name of a registered validator replacing the default one.
    pub custom_validator: Option<String>,
    /// Reject uploads whose destination already exists.
    pub check_file_exists: bool,
    /// Prepended to the stored filename.
    pub name_prefix: String,
    /// Maximum size in bytes, inclusive.
    pub max_size: Option<u64>,
    pub valid_extensions: BTreeSet<String>,
}

impl UploadOptions {
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            use_error_reporting: config.use_error_reporting,
            use_safe_name: config.use_safe_name,
            use_content_check: config.use_content_check,
            upload_path: config.upload_path.clone(),
            custom_validator: None,
            check_file_exists: config.check_file_exists,
            name_prefix: String::new(),
            max_size: config.max_file_size_bytes,
            valid_extensions: config.allowed_extensions.iter().cloned().collect(),
        }
    }

    /// Apply `overrides` on top of these options and normalize the upload path.
    pub fn merged(mut self, overrides: OptionOverrides) -> Self {
        if let Some(v) = overrides.use_error_reporting {
            self.use_error_reporting = v;
        }
        if let Some(v) = overrides.use_safe_name {
            self.use_safe_name = v;
        }
        if let Some(v) = overrides.use_content_check {
            self.use_content_check = v;
        }
        if let Some(v) = overrides.upload_path {
            self.upload_path = v;
        }
        if let Some(v) = overrides.custom_validator {
            self.custom_validator = Some(v).filter(|name| !name.is_empty());
        }
        if let Some(v) = overrides.check_file_exists {
            self.check_file_exists = v;
        }
        if let Some(v) = overrides.name_prefix {
            self.name_prefix = v;
        }
        if let Some(v) = overrides.max_size {
            self.max_size = v;
        }
        if let Some(v) = overrides.valid_extensions {
            self.valid_extensions = v.into_iter().map(|e| e.trim().to_lowercase()).collect();
        }

        self.upload_path = normalize_upload_path(&self.upload_path);
        self
    }
}

/// Caller-supplied overrides; unset fields keep their configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOverrides {
    pub use_error_reporting: Option<bool>,
    pub use_safe_name: Option<bool>,
    pub use_content_check: Option<bool>,
    pub upload_path: Option<String>,
    pub custom_validator: Option<String>,
    pub check_file_exists: Option<bool>,
    pub name_prefix: Option<String>,
    /// `Some(None)` (JSON `null`) clears a configured limit.
    #[serde(deserialize_with = "deserialize_max_size")]
    pub max_size: Option<Option<u64>>,
    pub valid_extensions: Option<Vec<String>>,
}

// Present-but-null must stay distinguishable from absent.
fn deserialize_max_size<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Some)
}

/// Use forward slashes and guarantee a trailing `/`.
pub fn normalize_upload_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_trailing_slash() {
        assert_eq!(normalize_upload_path("datas/uploads"), "datas/uploads/");
        assert_eq!(normalize_upload_path("datas/uploads/"), "datas/uploads/");
    }

    #[test]
    fn normalize_converts_backslashes() {
        assert_eq!(normalize_upload_path(r"C:\site\uploads"), "C:/site/uploads/");
    }

    #[test]
    fn defaults_come_from_config() {
        let config = IntakeConfig::default();
        let options = UploadOptions::from_config(&config).merged(OptionOverrides::default());

        assert!(options.use_safe_name);
        assert!(options.check_file_exists);
        assert_eq!(options.upload_path, "datas/uploads/");
        assert!(options.valid_extensions.contains("jpg"));
        assert_eq!(options.custom_validator, None);
    }

    #[test]
    fn overrides_replace_only_set_fields() {
        let config = IntakeConfig::default();
        let options = UploadOptions::from_config(&config).merged(OptionOverrides {
            use_content_check: Some(false),
            max_size: Some(Some(1024)),
            valid_extensions: Some(vec!["PDF".to_string()]),
            name_prefix: Some("u42_".to_string()),
            ..OptionOverrides::default()
        });

        assert!(!options.use_content_check);
        assert!(options.use_safe_name);
        assert_eq!(options.max_size, Some(1024));
        assert_eq!(options.name_prefix, "u42_");
        assert_eq!(
            options.valid_extensions.into_iter().collect::<Vec<_>>(),
            vec!["pdf".to_string()]
        );
    }

    #[test]
    fn empty_custom_validator_name_is_ignored() {
        let options = UploadOptions::from_config(&IntakeConfig::default()).merged(OptionOverrides {
            custom_validator: Some(String::new()),
            ..OptionOverrides::default()
        });
        assert_eq!(options.custom_validator, None);
    }

    #[test]
    fn overrides_deserialize_from_json() {
        let overrides: OptionOverrides =
            serde_json::from_str(r#"{"max_size": 10, "check_file_exists": false}"#).unwrap();
        assert_eq!(overrides.max_size, Some(Some(10)));
        assert_eq!(overrides.check_file_exists, Some(false));
        assert!(serde_json::from_str::<OptionOverrides>(r#"{"bogus": 1}"#).is_err());
    }

    #[test]
    fn null_max_size_clears_configured_limit() {
        let config = IntakeConfig {
            max_file_size_bytes: Some(2048),
            ..IntakeConfig::default()
        };

        let absent: OptionOverrides = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.max_size, None);
        let kept = UploadOptions::from_config(&config).merged(absent);
        assert_eq!(kept.max_size, Some(2048));

        let cleared: OptionOverrides = serde_json::from_str(r#"{"max_size": null}"#).unwrap();
        assert_eq!(cleared.max_size, Some(None));
        let options = UploadOptions::from_config(&config).merged(cleared);
        assert_eq!(options.max_size, None);
    }
}
