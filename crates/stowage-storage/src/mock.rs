//! Mock remote store for testing retry and fallback behaviour

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use stowage_core::{RemoteBackend, ResourceKind, TargetFolder, UploadResult};
use tokio::time::Instant;

use crate::keys::{
    file_stem, generate_object_key, provider_resource_type, result_format, sanitize_filename,
};
use crate::traits::{RemoteStore, StorageError, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    /// Return an upload error straight away
    Error,
    /// Sleep for the whole per-attempt timeout, then report a timeout
    Timeout,
    /// Return a connection-reset I/O error
    Io,
}

/// Remote store double that fails a configurable number of calls
///
/// Objects that "succeed" are kept in memory so tests can assert on them.
pub struct MockRemoteStore {
    failures: Option<u32>,
    mode: FailureMode,
    calls: AtomicU32,
    call_instants: Mutex<Vec<Instant>>,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MockRemoteStore {
    fn with(failures: Option<u32>, mode: FailureMode) -> Self {
        Self {
            failures,
            mode,
            calls: AtomicU32::new(0),
            call_instants: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Every call succeeds
    pub fn succeeding() -> Self {
        Self::with(Some(0), FailureMode::Error)
    }

    /// The first `n` calls fail with an upload error, later calls succeed
    pub fn failing_times(n: u32) -> Self {
        Self::with(Some(n), FailureMode::Error)
    }

    /// Every call fails with an upload error
    pub fn always_failing() -> Self {
        Self::with(None, FailureMode::Error)
    }

    /// Every call fails with a connection-reset I/O error
    pub fn always_failing_io() -> Self {
        Self::with(None, FailureMode::Io)
    }

    /// Every call hangs until its timeout expires
    pub fn always_timing_out() -> Self {
        Self::with(None, FailureMode::Timeout)
    }

    /// Number of upload calls made so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tokio instants at which each call started
    pub fn call_instants(&self) -> Vec<Instant> {
        self.call_instants.lock().unwrap().clone()
    }

    /// Payload stored under `key` (`{folder}/{name}`)
    pub fn stored(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Number of distinct objects stored
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn upload(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
        kind: ResourceKind,
        timeout: Duration,
    ) -> StorageResult<UploadResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.call_instants.lock().unwrap().push(Instant::now());

        let fails = match self.failures {
            None => true,
            Some(n) => call <= n,
        };

        if fails {
            return match self.mode {
                FailureMode::Error => Err(StorageError::UploadFailed(format!(
                    "mock provider unavailable (call {})",
                    call
                ))),
                FailureMode::Timeout => {
                    tokio::time::sleep(timeout).await;
                    Err(StorageError::Timeout(timeout.as_millis() as u64))
                }
                FailureMode::Io => Err(StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ))),
            };
        }

        let name = sanitize_filename(filename)?;
        let key = generate_object_key(folder, &name);
        let size = buffer.len() as u64;
        self.objects.lock().unwrap().insert(key.clone(), buffer);

        Ok(UploadResult {
            secure_url: format!("https://mock.example.com/{}", key),
            public_id: file_stem(&name),
            resource_type: provider_resource_type(kind, &name).to_string(),
            byte_size: size,
            format: result_format(&name),
            created_at: Utc::now(),
            is_fallback: false,
        })
    }

    fn backend_type(&self) -> RemoteBackend {
        RemoteBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_times_then_succeeds() {
        let store = MockRemoteStore::failing_times(2);
        let upload = || {
            store.upload(
                Bytes::from_static(b"abc"),
                "a.png",
                TargetFolder::Profiles,
                ResourceKind::Image,
                Duration::from_secs(1),
            )
        };

        assert!(upload().await.is_err());
        assert!(upload().await.is_err());
        let result = upload().await.unwrap();
        assert_eq!(result.secure_url, "https://mock.example.com/profiles/a.png");
        assert_eq!(store.call_count(), 3);
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_mode_waits_for_timeout() {
        let store = MockRemoteStore::always_timing_out();
        let start = Instant::now();
        let err = store
            .upload(
                Bytes::from_static(b"abc"),
                "a.mp3",
                TargetFolder::Audios,
                ResourceKind::Audio,
                Duration::from_secs(60),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Timeout(60_000)));
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }
}
