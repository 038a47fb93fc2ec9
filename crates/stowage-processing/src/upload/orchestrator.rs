//! Upload orchestrator: remote attempts with linear backoff, then local fallback.
//!
//! The orchestrator owns no storage itself. It is handed a [`RemoteStore`] and a
//! [`LocalFallbackStore`] at construction and drives them with an explicit attempt loop:
//!
//! ```text
//! Attempting(1) --fail--> Backoff(2s) --> Attempting(2) --fail--> Backoff(4s)
//!     --> Attempting(3) --fail--> FallenBack --> local write
//! ```
//!
//! Any successful remote attempt returns immediately. Calls are independent: no lock is
//! held across an await and the only shared state is the two injected stores.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use stowage_core::{AppError, ResourceKind, TargetFolder, UploadRequest, UploadResult};
use stowage_storage::{LocalFallbackStore, RemoteStore, StorageError};

use super::retry::{AttemptState, RetryPolicy, RetryState};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Every remote attempt failed and the local write failed as well.
    #[error("Upload failed after {attempts} remote attempt(s) ({remote}); local fallback failed")]
    Exhausted {
        attempts: u32,
        remote: StorageError,
        #[source]
        local: StorageError,
    },
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::upload_failed(err)
    }
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    remote: Arc<dyn RemoteStore>,
    fallback: Arc<LocalFallbackStore>,
    policy: RetryPolicy,
}

impl UploadOrchestrator {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        fallback: Arc<LocalFallbackStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            fallback,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn fallback(&self) -> &LocalFallbackStore {
        &self.fallback
    }

    /// Upload a raw buffer, letting the provider classify the resource.
    pub async fn upload_with_resilience(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
    ) -> Result<UploadResult, UploadError> {
        self.run(buffer, filename, folder, ResourceKind::Auto).await
    }

    /// Upload a request, honouring its resource kind.
    pub async fn upload_request(&self, request: &UploadRequest) -> Result<UploadResult, UploadError> {
        self.run(
            request.buffer.clone(),
            &request.filename,
            request.target_folder,
            request.resource_kind,
        )
        .await
    }

    async fn run(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
        kind: ResourceKind,
    ) -> Result<UploadResult, UploadError> {
        let start = Instant::now();
        let mut state = RetryState::new();
        let mut step = AttemptState::Attempting(state.next_attempt());

        loop {
            step = match step {
                AttemptState::Attempting(attempt) => {
                    match self
                        .remote
                        .upload(buffer.clone(), filename, folder, kind, self.policy.timeout)
                        .await
                    {
                        Ok(result) => {
                            tracing::info!(
                                filename = %filename,
                                folder = %folder,
                                attempt = attempt,
                                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                                secure_url = %result.secure_url,
                                "Remote upload succeeded"
                            );
                            return Ok(result);
                        }
                        Err(e) => {
                            tracing::warn!(
                                filename = %filename,
                                folder = %folder,
                                attempt = attempt,
                                max_attempts = self.policy.max_attempts,
                                error = %e,
                                "Remote upload attempt failed"
                            );
                            if e.is_transient() {
                                state.record_failure(e, &self.policy)
                            } else {
                                // Retrying cannot change the outcome.
                                state.attempts_made += 1;
                                state.last_error = Some(e);
                                AttemptState::FallenBack
                            }
                        }
                    }
                }
                AttemptState::Backoff(delay) => {
                    tracing::debug!(
                        filename = %filename,
                        delay_ms = delay.as_millis() as u64,
                        next_attempt = state.next_attempt(),
                        "Backing off before next remote attempt"
                    );
                    tokio::time::sleep(delay).await;
                    AttemptState::Attempting(state.next_attempt())
                }
                AttemptState::FallenBack => break,
            };
        }

        let remote_error = state.last_error.take().unwrap_or_else(|| {
            StorageError::UploadFailed("no remote attempt was made".to_string())
        });

        tracing::warn!(
            filename = %filename,
            folder = %folder,
            attempts = state.attempts_made,
            error = %remote_error,
            "Remote upload exhausted, falling back to local storage"
        );

        match self.fallback.save_locally(&buffer, filename).await {
            Ok(result) => Ok(result),
            Err(local) => {
                tracing::error!(
                    filename = %filename,
                    folder = %folder,
                    attempts = state.attempts_made,
                    remote_error = %remote_error,
                    error = %local,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload failed: remote and local fallback both failed"
                );
                Err(UploadError::Exhausted {
                    attempts: state.attempts_made,
                    remote: remote_error,
                    local,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stowage_storage::MockRemoteStore;
    use tempfile::tempdir;

    async fn orchestrator(
        remote: Arc<MockRemoteStore>,
        root: &std::path::Path,
    ) -> UploadOrchestrator {
        let fallback = LocalFallbackStore::with_default_prefix(root).await.unwrap();
        UploadOrchestrator::new(remote, Arc::new(fallback), RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_does_not_sleep() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::succeeding());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let start = tokio::time::Instant::now();
        let result = orchestrator
            .upload_with_resilience(Bytes::from_static(b"%PDF"), "report.pdf", TargetFolder::Documents)
            .await
            .unwrap();

        assert!(!result.is_fallback);
        assert_eq!(remote.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!dir.path().join("report.pdf").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_linear_backoff_then_succeeds() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::failing_times(2));
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let result = orchestrator
            .upload_with_resilience(Bytes::from_static(b"abc"), "a.png", TargetFolder::Profiles)
            .await
            .unwrap();

        assert!(!result.is_fallback);
        let calls = remote.call_instants();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(2));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fall_back_locally() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::always_failing());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let start = tokio::time::Instant::now();
        let result = orchestrator
            .upload_with_resilience(Bytes::from_static(b"hello"), "notes.pdf", TargetFolder::Documents)
            .await
            .unwrap();

        assert_eq!(remote.call_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert!(result.is_fallback);
        assert_eq!(result.secure_url, "/fallback/notes.pdf");
        assert_eq!(std::fs::read(dir.path().join("notes.pdf")).unwrap(), b"hello");
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_skips_remaining_attempts() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::succeeding());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let err = orchestrator
            .upload_with_resilience(Bytes::from_static(b"x"), "..", TargetFolder::Documents)
            .await
            .unwrap_err();

        assert_eq!(remote.call_count(), 1);
        let UploadError::Exhausted { attempts, remote, local } = err;
        assert_eq!(attempts, 1);
        assert!(matches!(remote, StorageError::InvalidKey(_)));
        assert!(matches!(local, StorageError::InvalidKey(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn local_failure_wraps_both_errors() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::always_failing());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;
        // A directory squatting on the target name makes the file create fail.
        std::fs::create_dir(dir.path().join("clip.mp3")).unwrap();

        let err = orchestrator
            .upload_with_resilience(Bytes::from_static(b"abc"), "clip.mp3", TargetFolder::Audios)
            .await
            .unwrap_err();

        let UploadError::Exhausted { attempts, remote, local } = &err;
        assert_eq!(*attempts, 3);
        assert!(matches!(remote, StorageError::UploadFailed(_)));
        assert!(matches!(local, StorageError::UploadFailed(_)));

        let app: AppError = err.into();
        assert!(matches!(app, AppError::UploadFailed { .. }));
        let details = app.detailed_message();
        assert!(details.contains("3 remote attempt(s)"));
        assert!(details.contains("Caused by: Upload failed: Failed to create file"));
    }

    #[tokio::test(start_paused = true)]
    async fn io_errors_use_the_full_retry_budget() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::always_failing_io());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let start = tokio::time::Instant::now();
        let result = orchestrator
            .upload_with_resilience(Bytes::from_static(b"abc"), "clip.mp3", TargetFolder::Audios)
            .await
            .unwrap();

        assert_eq!(remote.call_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert!(result.is_fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_request_passes_resource_kind() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(MockRemoteStore::succeeding());
        let orchestrator = orchestrator(remote.clone(), dir.path()).await;

        let request = UploadRequest::new(
            Bytes::from_static(b"ID3"),
            "song.mp3".to_string(),
            TargetFolder::Audios,
        );
        let result = orchestrator.upload_request(&request).await.unwrap();

        assert_eq!(result.resource_type, "video");
        assert_eq!(remote.stored("audios/song.mp3").unwrap(), Bytes::from_static(b"ID3"));
    }
}
