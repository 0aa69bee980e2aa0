use async_trait::async_trait;
use intake_core::{ErrorCode, ErrorReport, FileRecord, MessageResolver, UploadOptions, UPLOAD_ERR_OK};
use intake_services::{ContentScanner, ScanResult};
use intake_storage::UploadStore;
use std::path::Path;
use std::sync::Arc;

/// Result of validating one upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Errors recorded during this validation only.
    pub errors: ErrorReport,
}

impl Validation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            errors: ErrorReport::new(),
        }
    }

    /// Invalid with nothing recorded (integrity precondition failures).
    pub fn rejected() -> Self {
        Self {
            valid: false,
            errors: ErrorReport::new(),
        }
    }

    /// Valid exactly when `errors` is empty.
    pub fn from_report(errors: ErrorReport) -> Self {
        Self {
            valid: !errors.has_errors(),
            errors,
        }
    }
}

/// Decides whether an upload may be moved to its destination.
///
/// `record` is `None` when the requested field was not submitted.
#[async_trait]
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(&self, record: Option<&FileRecord>, options: &UploadOptions) -> Validation;
}

/// Upload validator
///
/// Integrity preconditions (record present, non-empty name, measured size equal
/// to the reported non-zero size, verified upload) short-circuit with no errors.
/// Every policy check after that runs, so one call reports all applicable codes.
pub struct DefaultValidator {
    store: Arc<dyn UploadStore>,
    scanner: Arc<dyn ContentScanner>,
    messages: Arc<dyn MessageResolver>,
}

impl DefaultValidator {
    pub const NAME: &'static str = "default";

    pub fn new(
        store: Arc<dyn UploadStore>,
        scanner: Arc<dyn ContentScanner>,
        messages: Arc<dyn MessageResolver>,
    ) -> Self {
        Self {
            store,
            scanner,
            messages,
        }
    }

    /// Check the integrity preconditions, returning the measured size on success.
    async fn measured_size(&self, file: &FileRecord) -> Option<u64> {
        if file.name.is_empty() {
            tracing::debug!("Upload has an empty filename");
            return None;
        }

        let measured = self.store.file_size(&file.tmp_name).await?;

        if measured != file.size {
            tracing::warn!(
                reported = file.size,
                measured,
                tmp_name = %file.tmp_name.display(),
                "Upload size mismatch"
            );
            return None;
        }

        if !self.store.is_verified_upload(&file.tmp_name).await {
            tracing::warn!(tmp_name = %file.tmp_name.display(), "Upload is not a verified transport file");
            return None;
        }

        if measured == 0 {
            tracing::debug!(tmp_name = %file.tmp_name.display(), "Upload is empty");
            return None;
        }

        Some(measured)
    }
}

#[async_trait]
impl Validator for DefaultValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn validate(&self, record: Option<&FileRecord>, options: &UploadOptions) -> Validation {
        let Some(file) = record else {
            return Validation::rejected();
        };

        let Some(measured) = self.measured_size(file).await else {
            return Validation::rejected();
        };

        let messages = self.messages.as_ref();
        let mut errors = ErrorReport::new();

        let extension_allowed = file
            .extension
            .as_ref()
            .is_some_and(|ext| options.valid_extensions.contains(ext));
        if !extension_allowed {
            errors.record_error(ErrorCode::FileExt, messages);
        }

        if options.check_file_exists && self.store.exists(Path::new(&file.upload_path)).await {
            errors.record_error(ErrorCode::FileExists, messages);
        }

        if file.error != UPLOAD_ERR_OK {
            errors.record_error(ErrorCode::FileError, messages);
        }

        if options.use_content_check {
            match self
                .scanner
                .scan(&file.tmp_name, &file.name, file.extension.as_deref())
                .await
            {
                ScanResult::Clean => {}
                ScanResult::Rejected(reason) => {
                    tracing::debug!(filename = %file.name, reason = %reason, "Content check rejected upload");
                    errors.record_error(ErrorCode::FileCheck, messages);
                }
                ScanResult::Error(err) => {
                    tracing::error!(filename = %file.name, error = %err, "Content check failed");
                    errors.record_error(ErrorCode::FileCheck, messages);
                }
            }
        }

        if let Some(max) = options.max_size {
            if measured > max {
                errors.record_error(ErrorCode::FileSize, messages);
            }
        }

        Validation::from_report(errors)
    }
}
