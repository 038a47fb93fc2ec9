//! Application-wide constants.

use std::time::Duration;

/// Per-attempt timeout for a remote upload.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Remote attempts made before the local fallback is used.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base of the linear backoff: attempt `n` is followed by a sleep of `n * DEFAULT_RETRY_DELAY`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2_000);

/// Directory the local fallback store writes into.
pub const DEFAULT_FALLBACK_DIR: &str = "./uploads/fallback";

/// URL namespace of files served from the local fallback store.
pub const FALLBACK_URL_PREFIX: &str = "/fallback";

/// Format reported for fallback files without an extension.
pub const FALLBACK_DEFAULT_FORMAT: &str = "bin";

/// Resource type reported for fallback files without an extension.
pub const FALLBACK_DEFAULT_RESOURCE_TYPE: &str = "raw";
