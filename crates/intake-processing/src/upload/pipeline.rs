//! Upload intake pipeline: sift → rename → validate → move.
//!
//! [`UploadIntake::handle`] takes one submitted file through the whole flow. The
//! file record is derived from the host's submitted-files table, optionally
//! renamed, validated by the default or a named custom validator, and, when valid,
//! renamed into its destination. Errors are collected per call and returned in the
//! result; nothing is kept between calls.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use intake_core::{
    ErrorCode, FileRecord, IntakeConfig, IntakeResult, MessageCatalog, MessageResolver,
    OptionOverrides, SubmittedFiles, UploadOptions,
};
use intake_services::{
    scanner_from_config, ContentScanner, ErrorReporter, NameSanitizer, SafeNameSanitizer,
    TracingErrorReporter,
};
use intake_storage::{LocalUploadStore, UploadStore};

use crate::registry::ValidatorRegistry;
use crate::validator::{DefaultValidator, Validator};

/// Upload intake service
pub struct UploadIntake {
    config: IntakeConfig,
    store: Arc<dyn UploadStore>,
    sanitizer: Arc<dyn NameSanitizer>,
    messages: Arc<dyn MessageResolver>,
    reporter: Arc<dyn ErrorReporter>,
    default_validator: Arc<dyn Validator>,
    registry: ValidatorRegistry,
}

impl UploadIntake {
    pub fn builder(config: IntakeConfig, store: Arc<dyn UploadStore>) -> UploadIntakeBuilder {
        UploadIntakeBuilder::new(config, store)
    }

    /// Wire the default collaborators described by `config`.
    ///
    /// Uses a [`LocalUploadStore`] rooted at the configured spool directory and loads
    /// the message catalog from `messages_path` when one is configured.
    pub async fn from_config(config: IntakeConfig) -> Result<Self> {
        config.validate().context("Invalid intake configuration")?;

        let store = LocalUploadStore::new(config.spool_path.clone())
            .await
            .context("Failed to initialize upload spool")?;

        let messages = match &config.messages_path {
            Some(path) => MessageCatalog::from_file(path)
                .with_context(|| format!("Failed to load messages from {}", path.display()))?,
            None => MessageCatalog::new(),
        };

        let scanner = scanner_from_config(&config);

        Ok(Self::builder(config, Arc::new(store))
            .with_messages(Arc::new(messages))
            .with_scanner(scanner)
            .build())
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Default options merged with `overrides`.
    pub fn options(&self, overrides: OptionOverrides) -> UploadOptions {
        UploadOptions::from_config(&self.config).merged(overrides)
    }

    /// Handle the upload submitted under `field`.
    #[tracing::instrument(skip(self, files, overrides), fields(field = %field, operation = "upload_intake"))]
    pub async fn handle(
        &self,
        files: &SubmittedFiles,
        field: &str,
        overrides: OptionOverrides,
    ) -> IntakeResult {
        let options = self.options(overrides);
        let record = self.sift(files, field, &options);

        let validator = self.resolve_validator(&options).await;
        let validation = validator.validate(record.as_ref(), &options).await;
        let mut errors = validation.errors;

        if validation.valid {
            match record {
                Some(file) => {
                    match self
                        .store
                        .move_verified_upload(&file.tmp_name, Path::new(&file.upload_path))
                        .await
                    {
                        Ok(()) => {
                            tracing::info!(
                                filename = %file.name,
                                destination = %file.upload_path,
                                size_bytes = file.size,
                                "Upload accepted"
                            );
                            return IntakeResult::Success { file };
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                destination = %file.upload_path,
                                "Failed to move upload into place"
                            );
                            errors.record_error(ErrorCode::FileName, self.messages.as_ref());
                        }
                    }
                }
                None => {
                    tracing::warn!(validator = %validator.name(), "Validator accepted a missing upload");
                    errors.record_error(ErrorCode::FileName, self.messages.as_ref());
                }
            }
        }

        tracing::debug!(
            validator = %validator.name(),
            codes = ?errors.codes(),
            "Upload rejected"
        );

        if options.use_error_reporting {
            for (code, message) in errors.list_errors() {
                self.reporter.report(*code, message);
            }
        }

        IntakeResult::Failure { errors }
    }

    /// Delete a previously accepted file; returns whether a file was removed.
    pub async fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.store.remove(path.as_ref()).await
    }

    /// Build the file record for `field`, applying safe name and prefix.
    fn sift(&self, files: &SubmittedFiles, field: &str, options: &UploadOptions) -> Option<FileRecord> {
        let Some(submitted) = files.get(field) else {
            tracing::debug!(field = %field, "No file submitted under field");
            return None;
        };

        let mut file = FileRecord::from_submitted(submitted, &options.upload_path);

        if options.use_safe_name {
            let safe = self.sanitizer.sanitize(&file.name);
            if safe != file.name {
                tracing::debug!(original = %file.name, safe = %safe, "Sanitized filename");
            }
            file.rename(safe);
        }

        if !options.name_prefix.is_empty() {
            let prefixed = format!("{}{}", options.name_prefix, file.name);
            file.rename(prefixed);
        }

        Some(file)
    }

    async fn resolve_validator(&self, options: &UploadOptions) -> Arc<dyn Validator> {
        let Some(name) = options.custom_validator.as_deref() else {
            return self.default_validator.clone();
        };

        match self.registry.get(name).await {
            Ok(validator) => validator,
            Err(e) => {
                tracing::warn!(error = %e, "Custom validator not registered, using default");
                self.default_validator.clone()
            }
        }
    }
}

/// Builder for [`UploadIntake`]; unset collaborators get their defaults.
pub struct UploadIntakeBuilder {
    config: IntakeConfig,
    store: Arc<dyn UploadStore>,
    sanitizer: Option<Arc<dyn NameSanitizer>>,
    scanner: Option<Arc<dyn ContentScanner>>,
    messages: Option<Arc<dyn MessageResolver>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    registry: Option<ValidatorRegistry>,
}

impl UploadIntakeBuilder {
    pub fn new(config: IntakeConfig, store: Arc<dyn UploadStore>) -> Self {
        Self {
            config,
            store,
            sanitizer: None,
            scanner: None,
            messages: None,
            reporter: None,
            registry: None,
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn NameSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn ContentScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_messages(mut self, messages: Arc<dyn MessageResolver>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> UploadIntake {
        let scanner = self
            .scanner
            .unwrap_or_else(|| scanner_from_config(&self.config));
        let messages = self
            .messages
            .unwrap_or_else(|| Arc::new(MessageCatalog::new()));

        let default_validator: Arc<dyn Validator> = Arc::new(DefaultValidator::new(
            self.store.clone(),
            scanner,
            messages.clone(),
        ));

        UploadIntake {
            config: self.config,
            store: self.store,
            sanitizer: self
                .sanitizer
                .unwrap_or_else(|| Arc::new(SafeNameSanitizer::new())),
            messages,
            reporter: self
                .reporter
                .unwrap_or_else(|| Arc::new(TracingErrorReporter)),
            default_validator,
            registry: self.registry.unwrap_or_default(),
        }
    }
}
