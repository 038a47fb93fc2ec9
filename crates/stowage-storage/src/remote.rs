use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
#[cfg(feature = "storage-s3")]
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    MultipartUpload, ObjectStore, ObjectStoreExt, PutPayload, PutResult, Result as ObjectResult,
};
use stowage_core::{RemoteBackend, ResourceKind, TargetFolder, UploadResult};
use tokio::time::Instant;

use crate::keys::{
    file_stem, generate_object_key, provider_resource_type, result_format, sanitize_filename,
};
use crate::traits::{RemoteStore, StorageError, StorageResult};

/// Size of each part written to the multipart upload stream.
///
/// S3 rejects non-final parts smaller than 5 MiB.
const PART_SIZE: usize = 5 * 1024 * 1024;

/// Upper bound on aborting a failed multipart upload.
const ABORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote store backed by an `object_store` implementation
#[derive(Clone)]
pub struct ObjectRemoteStore<S> {
    store: S,
    backend: RemoteBackend,
    bucket: String,
    public_base_url: String,
}

/// Amazon S3 or an S3-compatible provider
#[cfg(feature = "storage-s3")]
pub type S3RemoteStore = ObjectRemoteStore<AmazonS3>;

/// Process-local object store, for development and tests
pub type MemoryRemoteStore = ObjectRemoteStore<InMemory>;

#[cfg(feature = "storage-s3")]
impl ObjectRemoteStore<AmazonS3> {
    /// Create a new S3 remote store
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn s3(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        // Credentials come from the environment (AWS_ACCESS_KEY_ID, etc.).
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        // S3-compatible providers get path-style URLs: {endpoint}/{bucket}/{key}
        let public_base_url = match endpoint_url {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        };

        Ok(ObjectRemoteStore {
            store,
            backend: RemoteBackend::S3,
            bucket,
            public_base_url,
        })
    }
}

impl ObjectRemoteStore<InMemory> {
    /// Create an in-memory remote store whose URLs start with `public_base_url`
    pub fn in_memory(public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        ObjectRemoteStore {
            store: InMemory::new(),
            backend: RemoteBackend::Memory,
            bucket: "memory".to_string(),
            public_base_url,
        }
    }
}

impl<S: ObjectStore> ObjectRemoteStore<S> {
    /// Underlying object store
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Generate the public URL of an object key
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Write `buffer` part by part, then complete the upload.
    async fn stream_parts(
        upload: &mut dyn MultipartUpload,
        buffer: &Bytes,
    ) -> ObjectResult<PutResult> {
        let mut offset = 0;
        while offset < buffer.len() {
            let end = (offset + PART_SIZE).min(buffer.len());
            upload
                .put_part(PutPayload::from(buffer.slice(offset..end)))
                .await?;
            offset = end;
        }
        upload.complete().await
    }

    /// Best-effort abort of a pending multipart upload, bounded by [`ABORT_TIMEOUT`].
    async fn abort_upload(upload: &mut dyn MultipartUpload, key: &str) {
        match tokio::time::timeout(ABORT_TIMEOUT, upload.abort()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(error = %e, key = %key, "Failed to abort multipart upload");
            }
            Err(_) => {
                tracing::debug!(
                    key = %key,
                    timeout_ms = ABORT_TIMEOUT.as_millis() as u64,
                    "Aborting multipart upload timed out"
                );
            }
        }
    }
}

#[async_trait]
impl<S: ObjectStore> RemoteStore for ObjectRemoteStore<S> {
    async fn upload(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
        kind: ResourceKind,
        timeout: Duration,
    ) -> StorageResult<UploadResult> {
        let name = sanitize_filename(filename)?;
        let key = generate_object_key(folder, &name);
        let location = Path::from(key.clone());
        let size = buffer.len() as u64;
        let timeout_ms = timeout.as_millis() as u64;

        let start = std::time::Instant::now();
        let deadline = Instant::now() + timeout;

        let mut upload = match tokio::time::timeout_at(deadline, self.store.put_multipart(&location))
            .await
        {
            Ok(Ok(upload)) => upload,
            Ok(Err(e)) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload stream could not be opened"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
            Err(_) => return Err(StorageError::Timeout(timeout_ms)),
        };

        let outcome =
            tokio::time::timeout_at(deadline, Self::stream_parts(upload.as_mut(), &buffer)).await;

        let failure = match outcome {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(StorageError::UploadFailed(e.to_string())),
            Err(_) => Some(StorageError::Timeout(timeout_ms)),
        };

        if let Some(err) = failure {
            tracing::error!(
                error = %err,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote upload failed"
            );
            Self::abort_upload(upload.as_mut(), &key).await;
            return Err(err);
        }

        let result = UploadResult {
            secure_url: self.generate_url(location.as_ref()),
            public_id: file_stem(&name),
            resource_type: provider_resource_type(kind, &name).to_string(),
            byte_size: size,
            format: result_format(&name),
            created_at: Utc::now(),
            is_fallback: false,
        };

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(result)
    }

    fn backend_type(&self) -> RemoteBackend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryRemoteStore {
        ObjectRemoteStore::in_memory("memory://stowage/")
    }

    async fn stored_bytes(store: &MemoryRemoteStore, key: &str) -> Bytes {
        store
            .inner()
            .get(&Path::from(key))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_stores_object_and_builds_result() {
        let store = store();
        let data = Bytes::from_static(b"%PDF-1.4 fake");

        let result = store
            .upload(
                data.clone(),
                "report.pdf",
                TargetFolder::Documents,
                ResourceKind::Raw,
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert!(!result.is_fallback);
        assert_eq!(result.public_id, "report");
        assert_eq!(result.secure_url, "memory://stowage/documents/report.pdf");
        assert_eq!(result.resource_type, "raw");
        assert_eq!(result.format, "pdf");
        assert_eq!(result.byte_size, data.len() as u64);
        assert_eq!(stored_bytes(&store, "documents/report.pdf").await, data);
    }

    #[tokio::test]
    async fn test_same_name_overwrites() {
        let store = store();

        for payload in [&b"first"[..], &b"second version"[..]] {
            store
                .upload(
                    Bytes::copy_from_slice(payload),
                    "clip.mp3",
                    TargetFolder::Audios,
                    ResourceKind::Auto,
                    Duration::from_secs(5),
                )
                .await
                .unwrap();
        }

        assert_eq!(
            stored_bytes(&store, "audios/clip.mp3").await,
            Bytes::from_static(b"second version")
        );
    }

    #[tokio::test]
    async fn test_distinct_unicode_names_do_not_collide() {
        let store = store();
        let mut urls = Vec::new();

        for (name, payload) in [("合同.pdf", &b"contract A"[..]), ("发票.pdf", &b"invoice B"[..])] {
            let result = store
                .upload(
                    Bytes::copy_from_slice(payload),
                    name,
                    TargetFolder::Documents,
                    ResourceKind::Raw,
                    Duration::from_secs(5),
                )
                .await
                .unwrap();
            urls.push(result.secure_url);
        }

        assert_ne!(urls[0], urls[1]);
        assert_eq!(
            stored_bytes(&store, "documents/合同.pdf").await,
            Bytes::from_static(b"contract A")
        );
        assert_eq!(
            stored_bytes(&store, "documents/发票.pdf").await,
            Bytes::from_static(b"invoice B")
        );
    }

    #[tokio::test]
    async fn test_large_buffer_is_split_into_parts() {
        let store = store();
        let data = Bytes::from(vec![7u8; PART_SIZE + 1024]);

        let result = store
            .upload(
                data.clone(),
                "../room.png",
                TargetFolder::RoomImages,
                ResourceKind::Image,
                Duration::from_secs(30),
            )
            .await
            .unwrap();

        assert_eq!(result.resource_type, "image");
        assert_eq!(stored_bytes(&store, "room_images/room.png").await, data);
    }

    #[tokio::test]
    async fn test_invalid_filename_is_rejected() {
        let store = store();
        let result = store
            .upload(
                Bytes::from_static(b"x"),
                "..",
                TargetFolder::Documents,
                ResourceKind::Raw,
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[derive(Debug)]
    struct StalledUpload;

    #[async_trait]
    impl MultipartUpload for StalledUpload {
        fn put_part(&mut self, _data: PutPayload) -> object_store::UploadPart {
            Box::pin(std::future::pending::<ObjectResult<()>>())
        }

        async fn complete(&mut self) -> ObjectResult<PutResult> {
            std::future::pending().await
        }

        async fn abort(&mut self) -> ObjectResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_abort_is_bounded() {
        let mut upload = StalledUpload;
        let start = Instant::now();

        MemoryRemoteStore::abort_upload(&mut upload, "documents/report.pdf").await;

        assert_eq!(start.elapsed(), ABORT_TIMEOUT);
    }

    #[test]
    fn test_backend_type() {
        assert_eq!(store().backend_type(), RemoteBackend::Memory);
    }
}
