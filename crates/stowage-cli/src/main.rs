//! Stowage CLI: push files through the resilient upload pipeline.
//!
//! Configuration comes from the environment (and `.env`); see `stowage_core::config`.

use std::path::PathBuf;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use stowage_cli::{
    build_service, init_tracing, log_app_error, parse_folder, print_json, FallbackCheck,
    UploadOutput,
};
use stowage_core::{AppError, Config, TargetFolder};
use stowage_processing::extract_text_async;

#[derive(Parser)]
#[command(name = "stowage", about = "Resilient media upload pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, retrying the remote store and falling back to local disk
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Target folder: documents, audios, profiles, room_images
        #[arg(long, value_parser = parse_folder)]
        folder: TargetFolder,
        /// Also extract the text of an uploaded PDF
        #[arg(long)]
        extract_text: bool,
    },
    /// Extract the text of a PDF
    Extract {
        /// Path to the PDF
        file: PathBuf,
    },
    /// Check whether a URL points into the local fallback store
    IsFallback {
        /// URL returned by a previous upload
        url: String,
    },
}

async fn read_file(path: &PathBuf) -> anyhow::Result<(Bytes, String)> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Path has no usable file name: {}", path.display()))?
        .to_string();
    Ok((Bytes::from(data), filename))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            folder,
            extract_text,
        } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let service = build_service(&config).await?;
            let (buffer, filename) = read_file(&file).await?;

            let outcome = match folder {
                TargetFolder::Documents => service
                    .upload_document(buffer, &filename, extract_text)
                    .await
                    .map(|upload| (upload.result, extract_text.then_some(upload.text))),
                TargetFolder::Audios => service
                    .upload_audio(buffer, &filename)
                    .await
                    .map(|result| (result, None)),
                TargetFolder::Profiles => service
                    .upload_profile_image(buffer, &filename)
                    .await
                    .map(|result| (result, None)),
                TargetFolder::RoomImages => service
                    .upload_room_image(buffer, &filename)
                    .await
                    .map(|result| (result, None)),
            };

            match outcome {
                Ok((result, text)) => print_json(&UploadOutput::success(result, text))?,
                Err(err) => {
                    log_app_error(&err);
                    print_json(&UploadOutput::failure(&err, config.is_production()))?;
                    return Err(upload_failure(err));
                }
            }
        }
        Commands::Extract { file } => {
            let (buffer, _) = read_file(&file).await?;
            let text = extract_text_async(buffer).await;
            print_json(&serde_json::json!({ "text": text }))?;
        }
        Commands::IsFallback { url } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            print_json(&FallbackCheck::new(url, &config))?;
        }
    }

    Ok(())
}

fn upload_failure(err: AppError) -> anyhow::Error {
    anyhow::Error::new(err).context("Upload failed")
}
