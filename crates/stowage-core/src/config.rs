//! Configuration module
//!
//! This module provides the configuration of the upload pipeline: remote storage
//! settings, retry policy, local fallback location and caller-side upload limits.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_FALLBACK_DIR, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_UPLOAD_TIMEOUT,
    FALLBACK_URL_PREFIX,
};
use crate::models::TargetFolder;
use crate::storage_types::RemoteBackend;

const MAX_DOCUMENT_SIZE_MB: usize = 50;
const MAX_AUDIO_SIZE_MB: usize = 100;
const MAX_IMAGE_SIZE_MB: usize = 10;
const DEFAULT_MEMORY_BASE_URL: &str = "memory://stowage";

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct UploadPipelineConfig {
    pub environment: String,
    // Remote storage configuration
    pub remote_backend: RemoteBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub aws_region: Option<String>,
    pub remote_public_base_url: String,
    // Retry policy
    pub upload_timeout_ms: u64,
    pub upload_max_retries: u32,
    pub upload_retry_delay_ms: u64,
    // Local fallback
    pub fallback_dir: String,
    pub fallback_url_prefix: String,
    // Caller-side limits
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub max_audio_size_bytes: usize,
    pub audio_allowed_extensions: Vec<String>,
    pub max_image_size_bytes: usize,
    pub image_allowed_extensions: Vec<String>,
}

impl Default for UploadPipelineConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            remote_backend: RemoteBackend::S3,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            remote_public_base_url: DEFAULT_MEMORY_BASE_URL.to_string(),
            upload_timeout_ms: DEFAULT_UPLOAD_TIMEOUT.as_millis() as u64,
            upload_max_retries: DEFAULT_MAX_RETRIES,
            upload_retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            fallback_dir: DEFAULT_FALLBACK_DIR.to_string(),
            fallback_url_prefix: FALLBACK_URL_PREFIX.to_string(),
            max_document_size_bytes: MAX_DOCUMENT_SIZE_MB * 1024 * 1024,
            document_allowed_extensions: split_list("pdf"),
            max_audio_size_bytes: MAX_AUDIO_SIZE_MB * 1024 * 1024,
            audio_allowed_extensions: split_list("mp3,wav,ogg"),
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
            image_allowed_extensions: split_list("jpg,jpeg,png,gif,webp"),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadPipelineConfig>);

impl Config {
    pub fn new(config: UploadPipelineConfig) -> Self {
        Config(Box::new(config))
    }

    fn as_pipeline(&self) -> &UploadPipelineConfig {
        &self.0
    }

    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = UploadPipelineConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// In-memory backend with the fallback rooted at `fallback_dir`.
    pub fn for_tests(fallback_dir: impl Into<String>) -> Self {
        Config::new(UploadPipelineConfig {
            environment: "test".to_string(),
            remote_backend: RemoteBackend::Memory,
            fallback_dir: fallback_dir.into(),
            ..UploadPipelineConfig::default()
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_pipeline().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_pipeline().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn environment(&self) -> &str {
        &self.as_pipeline().environment
    }

    pub fn remote_backend(&self) -> RemoteBackend {
        self.as_pipeline().remote_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_pipeline().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_pipeline().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_pipeline().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_pipeline().aws_region.as_deref()
    }

    pub fn remote_public_base_url(&self) -> &str {
        &self.as_pipeline().remote_public_base_url
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.as_pipeline().upload_timeout_ms)
    }

    pub fn upload_max_retries(&self) -> u32 {
        self.as_pipeline().upload_max_retries
    }

    pub fn upload_retry_delay(&self) -> Duration {
        Duration::from_millis(self.as_pipeline().upload_retry_delay_ms)
    }

    pub fn fallback_dir(&self) -> &str {
        &self.as_pipeline().fallback_dir
    }

    pub fn fallback_url_prefix(&self) -> &str {
        &self.as_pipeline().fallback_url_prefix
    }

    pub fn max_size_bytes(&self, folder: TargetFolder) -> usize {
        let config = self.as_pipeline();
        match folder {
            TargetFolder::Documents => config.max_document_size_bytes,
            TargetFolder::Audios => config.max_audio_size_bytes,
            TargetFolder::Profiles | TargetFolder::RoomImages => config.max_image_size_bytes,
        }
    }

    pub fn allowed_extensions(&self, folder: TargetFolder) -> &[String] {
        let config = self.as_pipeline();
        match folder {
            TargetFolder::Documents => &config.document_allowed_extensions,
            TargetFolder::Audios => &config.audio_allowed_extensions,
            TargetFolder::Profiles | TargetFolder::RoomImages => &config.image_allowed_extensions,
        }
    }
}

impl UploadPipelineConfig {
    /// Build the configuration from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = UploadPipelineConfig::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        let remote_backend = match lookup("REMOTE_BACKEND") {
            Some(value) => value.parse::<RemoteBackend>()?,
            None => defaults.remote_backend,
        };

        let size_mb = |key: &str, default: usize| -> usize {
            lookup(key)
                .and_then(|s| s.trim().parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(default)
        };

        let config = UploadPipelineConfig {
            environment,
            remote_backend,
            s3_bucket: lookup("S3_BUCKET").filter(|s| !s.is_empty()),
            s3_region: lookup("S3_REGION").filter(|s| !s.is_empty()),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|s| !s.is_empty()),
            aws_region: lookup("AWS_REGION").filter(|s| !s.is_empty()),
            remote_public_base_url: lookup("REMOTE_PUBLIC_BASE_URL")
                .unwrap_or(defaults.remote_public_base_url),
            upload_timeout_ms: lookup("UPLOAD_TIMEOUT_MS")
                .map(|s| {
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| anyhow::anyhow!("UPLOAD_TIMEOUT_MS must be a valid number"))
                })
                .transpose()?
                .unwrap_or(defaults.upload_timeout_ms),
            upload_max_retries: lookup("UPLOAD_MAX_RETRIES")
                .map(|s| {
                    s.trim()
                        .parse::<u32>()
                        .map_err(|_| anyhow::anyhow!("UPLOAD_MAX_RETRIES must be a valid number"))
                })
                .transpose()?
                .unwrap_or(defaults.upload_max_retries),
            upload_retry_delay_ms: lookup("UPLOAD_RETRY_DELAY_MS")
                .map(|s| {
                    s.trim().parse::<u64>().map_err(|_| {
                        anyhow::anyhow!("UPLOAD_RETRY_DELAY_MS must be a valid number")
                    })
                })
                .transpose()?
                .unwrap_or(defaults.upload_retry_delay_ms),
            fallback_dir: lookup("FALLBACK_DIR")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.fallback_dir),
            fallback_url_prefix: lookup("FALLBACK_URL_PREFIX")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.fallback_url_prefix),
            max_document_size_bytes: size_mb(
                "MAX_DOCUMENT_SIZE_MB",
                defaults.max_document_size_bytes,
            ),
            document_allowed_extensions: lookup("DOCUMENT_ALLOWED_EXTENSIONS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.document_allowed_extensions),
            max_audio_size_bytes: size_mb("MAX_AUDIO_SIZE_MB", defaults.max_audio_size_bytes),
            audio_allowed_extensions: lookup("AUDIO_ALLOWED_EXTENSIONS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.audio_allowed_extensions),
            max_image_size_bytes: size_mb("MAX_IMAGE_SIZE_MB", defaults.max_image_size_bytes),
            image_allowed_extensions: lookup("IMAGE_ALLOWED_EXTENSIONS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.image_allowed_extensions),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_max_retries == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_RETRIES must be at least 1"));
        }

        if self.upload_timeout_ms == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TIMEOUT_MS must be greater than 0"));
        }

        if self.fallback_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("FALLBACK_DIR must not be empty"));
        }

        if !self.fallback_url_prefix.starts_with('/') || self.fallback_url_prefix.len() < 2 {
            return Err(anyhow::anyhow!(
                "FALLBACK_URL_PREFIX must be an absolute path such as /fallback"
            ));
        }

        match self.remote_backend {
            RemoteBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 remote backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 remote backend"
                    ));
                }
            }
            RemoteBackend::Memory => {}
        }

        Ok(())
    }
}
