mod helpers;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use helpers::{setup_intake, setup_intake_with, submitted, FIELD, PNG_BYTES};
use intake_core::{
    ErrorCode, ErrorReport, FileRecord, IntakeConfig, MessageCatalog, OptionOverrides,
    SubmittedFiles, UploadOptions,
};
use intake_processing::{UploadIntake, Validation, Validator};

struct NamedValidator {
    name: &'static str,
    validation: Validation,
}

#[async_trait]
impl Validator for NamedValidator {
    fn name(&self) -> &str {
        self.name
    }

    async fn validate(&self, _record: Option<&FileRecord>, _options: &UploadOptions) -> Validation {
        self.validation.clone()
    }
}

fn with_validator(name: &str) -> OptionOverrides {
    OptionOverrides {
        custom_validator: Some(name.to_string()),
        ..OptionOverrides::default()
    }
}

#[tokio::test]
async fn test_valid_upload_is_moved_into_place() {
    let app = setup_intake().await;
    let files = app.submit("photo.png", PNG_BYTES).await;
    let tmp_name = files.get(FIELD).unwrap().tmp_name.clone();

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert!(result.is_success(), "unexpected failure: {:?}", result);
    let file = result.file().unwrap();
    assert_eq!(file.name, "photo.png");
    assert_eq!(file.extension.as_deref(), Some("png"));
    assert_eq!(file.size, PNG_BYTES.len() as u64);

    let destination = app.upload_dir().join("photo.png");
    assert_eq!(file.upload_path, destination.display().to_string());
    assert_eq!(std::fs::read(&destination).unwrap(), PNG_BYTES);
    assert!(!tmp_name.exists());
    assert!(app.reporter.take().is_empty());
}

#[tokio::test]
async fn test_absent_field_fails_without_codes() {
    let app = setup_intake().await;

    let result = app
        .intake
        .handle(&SubmittedFiles::new(), FIELD, OptionOverrides::default())
        .await;

    assert!(!result.is_success());
    assert!(result.error_codes().is_empty());
}

#[tokio::test]
async fn test_size_mismatch_fails_without_codes() {
    let app = setup_intake().await;
    let tmp_name = app.store.stage_bytes(b"hello").await.unwrap();
    let files = SubmittedFiles::new().with(FIELD, submitted("notes.txt", 42, tmp_name.clone()));

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert!(!result.is_success());
    assert!(result.error_codes().is_empty());
    assert!(tmp_name.exists());
    assert!(!app.upload_dir().join("notes.txt").exists());
}

#[tokio::test]
async fn test_unverified_source_is_never_moved() {
    let app = setup_intake().await;
    let outside = tempfile::tempdir().unwrap();
    let source = outside.path().join("notes.txt");
    std::fs::write(&source, b"hello").unwrap();
    let files = SubmittedFiles::new().with(FIELD, submitted("notes.txt", 5, source.clone()));

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert!(!result.is_success());
    assert!(result.error_codes().is_empty());
    assert!(source.exists());
}

#[tokio::test]
async fn test_bad_extension_and_existing_destination() {
    let app = setup_intake().await;
    std::fs::write(app.upload_dir().join("tool.exe"), b"old").unwrap();
    let files = app.submit("tool.exe", b"hello").await;

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert_eq!(
        result.error_codes(),
        vec![ErrorCode::FileExt, ErrorCode::FileExists]
    );
    assert_eq!(std::fs::read(app.upload_dir().join("tool.exe")).unwrap(), b"old");
}

#[tokio::test]
async fn test_max_size_boundaries() {
    let app = setup_intake().await;
    let limit = |max: u64| OptionOverrides {
        max_size: Some(Some(max)),
        ..OptionOverrides::default()
    };

    let files = app.submit("big.txt", b"0123456789").await;
    let result = app.intake.handle(&files, FIELD, limit(9)).await;
    assert_eq!(result.error_codes(), vec![ErrorCode::FileSize]);

    let files = app.submit("exact.txt", b"0123456789").await;
    assert!(app.intake.handle(&files, FIELD, limit(10)).await.is_success());

    let files = app.submit("small.txt", b"0123456789").await;
    assert!(app.intake.handle(&files, FIELD, limit(11)).await.is_success());
}

#[tokio::test]
async fn test_transport_error_is_reported() {
    let app = setup_intake().await;
    let tmp_name = app.store.stage_bytes(b"partial").await.unwrap();
    let mut file = submitted("notes.txt", 7, tmp_name);
    file.error = 3;
    let files = SubmittedFiles::new().with(FIELD, file);

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert_eq!(result.error_codes(), vec![ErrorCode::FileError]);
}

#[tokio::test]
async fn test_content_check_rejects_disguised_file() {
    let app = setup_intake().await;

    let files = app.submit("fake.png", b"<?php system($_GET['c']); ?>").await;
    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;
    assert_eq!(result.error_codes(), vec![ErrorCode::FileCheck]);

    let files = app.submit("fake.png", b"<?php system($_GET['c']); ?>").await;
    let unchecked = OptionOverrides {
        use_content_check: Some(false),
        ..OptionOverrides::default()
    };
    assert!(app.intake.handle(&files, FIELD, unchecked).await.is_success());
}

#[tokio::test]
async fn test_safe_name_then_prefix() {
    let app = setup_intake().await;
    let files = app.submit("My Photo (1).PNG", PNG_BYTES).await;
    let overrides = OptionOverrides {
        name_prefix: Some("user42_".to_string()),
        ..OptionOverrides::default()
    };

    let result = app.intake.handle(&files, FIELD, overrides).await;

    let file = result.file().unwrap();
    assert_eq!(file.name, "user42_My_Photo__1_.png");
    assert!(app.upload_dir().join("user42_My_Photo__1_.png").exists());
}

#[tokio::test]
async fn test_safe_name_disabled_keeps_client_name() {
    let app = setup_intake_with(|config| config.use_safe_name = false).await;
    let files = app.submit("My Photo.png", PNG_BYTES).await;

    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert_eq!(result.file().unwrap().name, "My Photo.png");
    assert!(app.upload_dir().join("My Photo.png").exists());
}

#[tokio::test]
async fn test_upload_path_override_is_normalized() {
    let app = setup_intake().await;
    let nested = app.upload_dir().join("avatars");
    let files = app.submit("photo.png", PNG_BYTES).await;
    let overrides = OptionOverrides {
        upload_path: Some(nested.display().to_string()),
        ..OptionOverrides::default()
    };

    let result = app.intake.handle(&files, FIELD, overrides).await;

    let file = result.file().unwrap();
    assert!(file.path.ends_with("avatars/"));
    assert!(nested.join("photo.png").exists());
}

#[tokio::test]
async fn test_custom_validator_replaces_default() {
    let app = setup_intake().await;
    let mut errors = ErrorReport::new();
    errors.insert(ErrorCode::FileCheck, "Quota exceeded");
    app.registry
        .register(Arc::new(NamedValidator {
            name: "quota",
            validation: Validation::from_report(errors),
        }))
        .await;

    let files = app.submit("photo.png", PNG_BYTES).await;
    let result = app.intake.handle(&files, FIELD, with_validator("quota")).await;

    assert_eq!(result.error_codes(), vec![ErrorCode::FileCheck]);
    assert_eq!(result.error_messages(), vec!["Quota exceeded".to_string()]);
}

#[tokio::test]
async fn test_custom_validator_can_accept_what_default_rejects() {
    let app = setup_intake().await;
    app.registry
        .register(Arc::new(NamedValidator {
            name: "lenient",
            validation: Validation::accepted(),
        }))
        .await;

    let files = app.submit("archive.rar", b"Rar!").await;
    let result = app.intake.handle(&files, FIELD, with_validator("lenient")).await;

    assert!(result.is_success());
    assert!(app.upload_dir().join("archive.rar").exists());
}

#[tokio::test]
async fn test_unknown_custom_validator_falls_back_to_default() {
    let app = setup_intake().await;

    let files = app.submit("photo.png", PNG_BYTES).await;
    assert!(app
        .intake
        .handle(&files, FIELD, with_validator("missing"))
        .await
        .is_success());

    let files = app.submit("tool.exe", b"hello").await;
    let result = app.intake.handle(&files, FIELD, with_validator("missing")).await;
    assert_eq!(result.error_codes(), vec![ErrorCode::FileExt]);
}

#[tokio::test]
async fn test_accepting_missing_record_reports_name_error() {
    let app = setup_intake().await;
    app.registry
        .register(Arc::new(NamedValidator {
            name: "lenient",
            validation: Validation::accepted(),
        }))
        .await;

    let result = app
        .intake
        .handle(&SubmittedFiles::new(), FIELD, with_validator("lenient"))
        .await;

    assert_eq!(result.error_codes(), vec![ErrorCode::FileName]);
}

#[tokio::test]
async fn test_move_failure_reports_name_error() {
    let app = setup_intake_with(|config| config.check_file_exists = false).await;
    let blocking_dir = app.upload_dir().join("notes.txt");
    std::fs::create_dir(&blocking_dir).unwrap();
    std::fs::write(blocking_dir.join("inner.txt"), b"keep").unwrap();

    let files = app.submit("notes.txt", b"hello").await;
    let tmp_name = files.get(FIELD).unwrap().tmp_name.clone();
    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    assert_eq!(result.error_codes(), vec![ErrorCode::FileName]);
    assert!(tmp_name.exists());
}

#[tokio::test]
async fn test_errors_do_not_leak_between_calls() {
    let app = setup_intake().await;

    let files = app.submit("tool.exe", b"hello").await;
    let first = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;
    assert_eq!(first.error_codes(), vec![ErrorCode::FileExt]);

    let files = app.submit("photo.png", PNG_BYTES).await;
    let second = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;
    assert!(second.is_success());
    assert!(second.errors().is_empty());
}

#[tokio::test]
async fn test_errors_are_forwarded_to_reporter() {
    let app = setup_intake().await;

    let files = app.submit("tool.exe", b"hello").await;
    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;

    let reported = app.reporter.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].0, ErrorCode::FileExt);
    assert_eq!(reported[0].1, result.error_messages()[0]);

    let files = app.submit("tool.exe", b"hello").await;
    let silent = OptionOverrides {
        use_error_reporting: Some(false),
        ..OptionOverrides::default()
    };
    let result = app.intake.handle(&files, FIELD, silent).await;
    assert!(!result.is_success());
    assert!(app.reporter.take().is_empty());
}

#[tokio::test]
async fn test_failure_serializes_for_host() {
    let app = setup_intake().await;
    let files = app.submit("tool.exe", b"hello").await;

    let result = app
        .intake
        .handle(&files, FIELD, OptionOverrides {
            max_size: Some(Some(1)),
            ..OptionOverrides::default()
        })
        .await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["error_codes"], serde_json::json!(["FILE_EXT", "FILE_SIZE"]));
    assert!(json["errors"]["FILE_EXT"].is_string());
    assert_eq!(json["error_messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_deletes_accepted_file() {
    let app = setup_intake().await;
    let files = app.submit("photo.png", PNG_BYTES).await;
    let result = app.intake.handle(&files, FIELD, OptionOverrides::default()).await;
    let stored = result.file().unwrap().upload_path.clone();

    assert!(app.intake.remove(&stored).await);
    assert!(!Path::new(&stored).exists());
    assert!(!app.intake.remove(&stored).await);
}

#[tokio::test]
async fn test_from_config_loads_message_catalog() {
    let spool = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let messages_path = uploads.path().join("messages.json");
    std::fs::write(&messages_path, r#"{"FILE_EXT": "Type de fichier refusé"}"#).unwrap();

    let config = IntakeConfig {
        upload_path: uploads.path().display().to_string(),
        spool_path: spool.path().to_path_buf(),
        messages_path: Some(messages_path),
        ..IntakeConfig::default()
    };
    let intake = UploadIntake::from_config(config).await.unwrap();

    let staged = spool.path().join("upload-manual");
    std::fs::write(&staged, b"hello").unwrap();
    let files = SubmittedFiles::new().with(FIELD, submitted("tool.exe", 5, staged));

    let result = intake.handle(&files, FIELD, OptionOverrides::default()).await;
    assert_eq!(result.error_messages(), vec!["Type de fichier refusé".to_string()]);
}

#[tokio::test]
async fn test_from_config_rejects_missing_catalog() {
    let spool = tempfile::tempdir().unwrap();
    let config = IntakeConfig {
        spool_path: spool.path().to_path_buf(),
        messages_path: Some(spool.path().join("missing.json")),
        ..IntakeConfig::default()
    };

    assert!(UploadIntake::from_config(config).await.is_err());
}

#[test]
fn test_default_message_catalog_covers_all_codes() {
    let catalog = MessageCatalog::new();
    for code in ErrorCode::ALL {
        let mut report = ErrorReport::new();
        report.record_error(code, &catalog);
        assert!(!report.messages()[0].is_empty());
    }
}
