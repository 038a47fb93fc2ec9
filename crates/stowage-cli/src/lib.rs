use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use stowage_core::{AppError, Config, ErrorMetadata, LogLevel, ResponseEnvelope, TargetFolder, UploadResult};
use stowage_processing::{MediaUploadService, RetryPolicy, UploadOrchestrator};
use stowage_storage::{create_fallback_store, create_remote_store, url_in_namespace};

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Wire the remote store, fallback directory and orchestrator from configuration.
pub async fn build_service(config: &Config) -> anyhow::Result<MediaUploadService> {
    let remote = create_remote_store(config).context("Failed to create remote store")?;
    let fallback = create_fallback_store(config)
        .await
        .context("Failed to prepare fallback directory")?;

    tracing::info!(
        environment = %config.environment(),
        backend = %remote.backend_type(),
        fallback_dir = %fallback.root().display(),
        "Upload pipeline ready"
    );

    let orchestrator = UploadOrchestrator::new(remote, fallback, RetryPolicy::from_config(config));
    Ok(MediaUploadService::new(orchestrator, config.clone()))
}

pub fn parse_folder(value: &str) -> Result<TargetFolder, String> {
    value.parse::<TargetFolder>().map_err(|e| e.to_string())
}

/// Upload envelope, plus the extracted text when it was requested.
#[derive(Debug, Serialize)]
pub struct UploadOutput {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope<UploadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Option<String>>,
}

impl UploadOutput {
    pub fn success(result: UploadResult, text: Option<Option<String>>) -> Self {
        let message = if result.is_fallback {
            "Stored locally; remote storage unavailable"
        } else {
            "Uploaded"
        };
        Self {
            envelope: ResponseEnvelope::created(result, message),
            text,
        }
    }

    pub fn failure(err: &AppError, production: bool) -> Self {
        Self {
            envelope: ResponseEnvelope::from_error(err, production),
            text: None,
        }
    }
}

/// Answer of `stowage is-fallback`.
#[derive(Debug, Serialize)]
pub struct FallbackCheck {
    pub url: String,
    pub is_fallback: bool,
}

impl FallbackCheck {
    /// Classify `url` against the configured fallback URL prefix.
    pub fn new(url: String, config: &Config) -> Self {
        let is_fallback = url_in_namespace(&url, config.fallback_url_prefix());
        Self { url, is_fallback }
    }
}

/// Log an upload failure at the level the error asks for.
pub fn log_app_error(err: &AppError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, code, "Upload rejected"),
        LogLevel::Warn => tracing::warn!(error = %err, code, "Upload rejected"),
        LogLevel::Error => {
            tracing::error!(error = %err.detailed_message(), code, "Upload failed")
        }
    }
}
