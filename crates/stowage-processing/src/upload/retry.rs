//! Retry policy for remote uploads
//!
//! Attempts are bounded and spaced by a linear backoff: the wait after the n-th failed
//! attempt is `base_delay * n` (2 s, then 4 s with the defaults).

use std::time::Duration;

use stowage_core::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_UPLOAD_TIMEOUT};
use stowage_core::Config;
use stowage_storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Remote attempts before falling back (at least 1)
    pub max_attempts: u32,
    /// Linear backoff base
    pub base_delay: Duration,
    /// Per-attempt timeout handed to the remote store
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.upload_max_retries(),
            config.upload_retry_delay(),
            config.upload_timeout(),
        )
    }

    /// Wait after `attempt` failed attempts (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|n| self.delay_for(n)).sum()
    }
}

/// Where a single orchestrator call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Calling the remote store for the given attempt (1-based)
    Attempting(u32),
    /// Sleeping before the next attempt
    Backoff(Duration),
    /// Remote attempts are exhausted, writing locally
    FallenBack,
}

/// Per-call retry bookkeeping. Never shared between calls.
#[derive(Debug, Default)]
pub struct RetryState {
    pub attempts_made: u32,
    pub last_error: Option<StorageError>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt and decide what happens next.
    pub fn record_failure(&mut self, error: StorageError, policy: &RetryPolicy) -> AttemptState {
        self.attempts_made += 1;
        self.last_error = Some(error);
        if self.attempts_made < policy.max_attempts {
            AttemptState::Backoff(policy.delay_for(self.attempts_made))
        } else {
            AttemptState::FallenBack
        }
    }

    pub fn next_attempt(&self) -> u32 {
        self.attempts_made + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_pipeline_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
        assert_eq!(policy.timeout, Duration::from_secs(60));
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.total_backoff(), Duration::from_secs(6));
    }

    #[test]
    fn zero_attempts_is_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }

    #[test]
    fn policy_from_config() {
        let config = Config::for_tests("/tmp/unused");
        assert_eq!(RetryPolicy::from_config(&config), RetryPolicy::default());
    }

    #[test]
    fn state_transitions() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();
        assert_eq!(state.next_attempt(), 1);

        let next = state.record_failure(StorageError::UploadFailed("a".into()), &policy);
        assert_eq!(next, AttemptState::Backoff(Duration::from_secs(2)));
        let next = state.record_failure(StorageError::Timeout(60_000), &policy);
        assert_eq!(next, AttemptState::Backoff(Duration::from_secs(4)));
        let next = state.record_failure(StorageError::UploadFailed("c".into()), &policy);
        assert_eq!(next, AttemptState::FallenBack);

        assert_eq!(state.attempts_made, 3);
        assert!(matches!(
            state.last_error,
            Some(StorageError::UploadFailed(ref m)) if m == "c"
        ));
    }
}
