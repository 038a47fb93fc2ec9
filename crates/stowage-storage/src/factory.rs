#[cfg(feature = "storage-s3")]
use crate::S3RemoteStore;
use crate::{
    LocalFallbackStore, MemoryRemoteStore, RemoteBackend, RemoteStore, StorageError,
    StorageResult,
};
use stowage_core::Config;
use std::sync::Arc;

/// Create the remote store selected by configuration
pub fn create_remote_store(config: &Config) -> StorageResult<Arc<dyn RemoteStore>> {
    match config.remote_backend() {
        #[cfg(feature = "storage-s3")]
        RemoteBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let store = S3RemoteStore::s3(bucket, region, endpoint)?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        RemoteBackend::S3 => Err(StorageError::ConfigError(
            "S3 remote backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        RemoteBackend::Memory => {
            tracing::warn!("Using in-memory remote store; uploads do not survive a restart");
            Ok(Arc::new(MemoryRemoteStore::in_memory(
                config.remote_public_base_url(),
            )))
        }
    }
}

/// Create the local fallback store, creating its directory if needed
///
/// Call once at startup and share the returned handle.
pub async fn create_fallback_store(config: &Config) -> StorageResult<Arc<LocalFallbackStore>> {
    let store = LocalFallbackStore::new(config.fallback_dir(), config.fallback_url_prefix()).await?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_core::config::UploadPipelineConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_memory_backend_and_fallback_from_config() {
        let dir = tempdir().unwrap();
        let config = Config::new(UploadPipelineConfig {
            remote_backend: RemoteBackend::Memory,
            fallback_dir: dir.path().join("fallback").to_string_lossy().into_owned(),
            ..UploadPipelineConfig::default()
        });

        let remote = create_remote_store(&config).unwrap();
        assert_eq!(remote.backend_type(), RemoteBackend::Memory);

        let fallback = create_fallback_store(&config).await.unwrap();
        assert!(fallback.root().is_dir());
        assert_eq!(fallback.url_prefix(), "/fallback");
    }

    #[cfg(feature = "storage-s3")]
    #[test]
    fn test_s3_backend_requires_bucket() {
        let config = Config::new(UploadPipelineConfig::default());
        assert!(create_remote_store(&config).is_err());
    }
}
