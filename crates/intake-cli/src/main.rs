//! Intake CLI: run a local file through the upload intake pipeline.
//!
//! Configuration comes from the environment (INTAKE_*, CLAMAV_*) or a `.env` file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_cli::{init_tracing, OverrideArgs};
use intake_core::{IntakeConfig, SubmittedFile, SubmittedFiles, UPLOAD_ERR_OK};
use intake_processing::UploadIntake;
use intake_storage::LocalUploadStore;

#[derive(Parser)]
#[command(name = "intake", about = "Upload intake pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage a local file as an upload and run it through intake
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Client filename to submit (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
        /// Form field the file is submitted under
        #[arg(long, default_value = "file")]
        field: String,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Delete a previously accepted file
    Remove {
        path: PathBuf,
    },
    /// Print the effective upload options
    Options {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize result")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = IntakeConfig::from_env().context("Failed to load intake configuration")?;
    let spool_path = config.spool_path.clone();
    let intake = UploadIntake::from_config(config).await?;

    match cli.command {
        Commands::Upload {
            file,
            name,
            field,
            overrides,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("File path has no filename")?,
            };

            let store = LocalUploadStore::new(spool_path).await?;
            let tmp_name = store
                .stage_file(&file)
                .await
                .with_context(|| format!("Failed to stage {}", file.display()))?;
            let size = tokio::fs::metadata(&tmp_name).await?.len();

            let files = SubmittedFiles::new().with(
                field.clone(),
                SubmittedFile {
                    name,
                    size,
                    tmp_name: tmp_name.clone(),
                    error: UPLOAD_ERR_OK,
                },
            );

            let result = intake.handle(&files, &field, overrides.into_overrides()?).await;
            if !result.is_success() {
                // Rejected uploads stay in the spool otherwise.
                if let Err(e) = tokio::fs::remove_file(&tmp_name).await {
                    tracing::debug!(path = %tmp_name.display(), error = %e, "Failed to clear staged upload");
                }
            }
            print_json(&result)?;

            if !result.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Remove { path } => {
            let removed = intake.remove(&path).await;
            print_json(&serde_json::json!({ "removed": removed, "path": path }))?;
            if !removed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Options { overrides } => {
            print_json(&intake.options(overrides.into_overrides()?))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
