use std::path::{Path, PathBuf};

use chrono::Utc;
use stowage_core::constants::{FALLBACK_DEFAULT_RESOURCE_TYPE, FALLBACK_URL_PREFIX};
use stowage_core::UploadResult;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::keys::{file_extension, file_stem, result_format, sanitize_filename};
use crate::traits::{StorageError, StorageResult};

/// Check whether `url` points into the default fallback namespace (`/fallback/...`).
pub fn is_fallback_url(url: &str) -> bool {
    url_in_namespace(url, FALLBACK_URL_PREFIX)
}

/// Check whether `url` sits under `prefix/`. A trailing slash on `prefix` is ignored.
pub fn url_in_namespace(url: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    !prefix.is_empty()
        && url
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Local filesystem store used when the remote provider is unreachable
///
/// Files are written flat under `root`, named by the sanitized original filename.
/// There is no manifest: the presence of a file is the only durability record, and a
/// second save under the same name replaces the first.
#[derive(Clone, Debug)]
pub struct LocalFallbackStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalFallbackStore {
    /// Create a new LocalFallbackStore, creating `root` if it does not exist
    ///
    /// # Arguments
    /// * `root` - Directory fallback files are written to (e.g., "./uploads/fallback")
    /// * `url_prefix` - URL namespace of fallback files (e.g., "/fallback")
    pub async fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();

        if !url_prefix.starts_with('/') || url_prefix.len() < 2 {
            return Err(StorageError::ConfigError(format!(
                "Fallback URL prefix must be an absolute path, got {:?}",
                url_prefix
            )));
        }

        // Safe to race: create_dir_all succeeds if another task created it first.
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create fallback directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalFallbackStore { root, url_prefix })
    }

    /// Fallback store with the default `/fallback` URL namespace
    pub async fn with_default_prefix(root: impl Into<PathBuf>) -> StorageResult<Self> {
        Self::new(root, FALLBACK_URL_PREFIX).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// On-disk location a file named `filename` is (or would be) saved at.
    pub fn path_for(&self, filename: &str) -> StorageResult<PathBuf> {
        let name = sanitize_filename(filename)?;
        Ok(self.root.join(name))
    }

    fn generate_url(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }

    /// Whether `url` belongs to this store's namespace.
    pub fn is_fallback_url(&self, url: &str) -> bool {
        url_in_namespace(url, &self.url_prefix)
    }

    /// Durably write `buffer` and return a result record tagged as fallback.
    ///
    /// A failure here is terminal for the upload: there is nowhere left to put the bytes.
    pub async fn save_locally(&self, buffer: &[u8], filename: &str) -> StorageResult<UploadResult> {
        let name = sanitize_filename(filename)?;
        let path = self.root.join(&name);
        let size = buffer.len();

        // The directory is created at startup; recreate it if it was removed since.
        fs::create_dir_all(&self.root).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(buffer).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let result = UploadResult {
            secure_url: self.generate_url(&name),
            public_id: file_stem(&name),
            resource_type: file_extension(&name)
                .unwrap_or_else(|| FALLBACK_DEFAULT_RESOURCE_TYPE.to_string()),
            byte_size: size as u64,
            format: result_format(&name),
            created_at: Utc::now(),
            is_fallback: true,
        };

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fallback: file saved locally"
        );

        Ok(result)
    }
}
