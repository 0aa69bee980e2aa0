#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use intake_core::{IntakeConfig, SubmittedFile, SubmittedFiles, UPLOAD_ERR_OK};
use intake_processing::{UploadIntake, ValidatorRegistry};
use intake_services::MemoryErrorReporter;
use intake_storage::LocalUploadStore;
use tempfile::TempDir;

pub const FIELD: &str = "upload";

pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE,
];

pub struct TestIntake {
    pub intake: UploadIntake,
    pub store: Arc<LocalUploadStore>,
    pub reporter: Arc<MemoryErrorReporter>,
    pub registry: ValidatorRegistry,
    spool: TempDir,
    uploads: TempDir,
}

impl TestIntake {
    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    pub fn spool_dir(&self) -> &Path {
        self.spool.path()
    }

    /// Stage `data` in the spool and submit it under [`FIELD`].
    pub async fn submit(&self, name: &str, data: &[u8]) -> SubmittedFiles {
        let tmp_name = self.store.stage_bytes(data).await.unwrap();
        SubmittedFiles::new().with(FIELD, submitted(name, data.len() as u64, tmp_name))
    }
}

pub fn submitted(name: &str, size: u64, tmp_name: PathBuf) -> SubmittedFile {
    SubmittedFile {
        name: name.to_string(),
        size,
        tmp_name,
        error: UPLOAD_ERR_OK,
    }
}

pub async fn setup_intake() -> TestIntake {
    setup_intake_with(|_| {}).await
}

pub async fn setup_intake_with(configure: impl FnOnce(&mut IntakeConfig)) -> TestIntake {
    let spool = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();

    let mut config = IntakeConfig {
        upload_path: uploads.path().display().to_string(),
        spool_path: spool.path().to_path_buf(),
        ..IntakeConfig::default()
    };
    configure(&mut config);

    let store = Arc::new(LocalUploadStore::new(spool.path()).await.unwrap());
    let reporter = Arc::new(MemoryErrorReporter::new());
    let registry = ValidatorRegistry::new();

    let intake = UploadIntake::builder(config, store.clone())
        .with_reporter(reporter.clone())
        .with_registry(registry.clone())
        .build();

    TestIntake {
        intake,
        store,
        reporter,
        registry,
        spool,
        uploads,
    }
}
