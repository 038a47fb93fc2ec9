//! Stowage Storage Library
//!
//! This crate provides the two stores the upload pipeline writes to:
//!
//! - a **remote store** ([`RemoteStore`]), implemented over `object_store` for S3 and
//!   S3-compatible providers (plus an in-memory backend for development). A remote store
//!   makes exactly one attempt per call; retries belong to the caller.
//! - the **local fallback store** ([`LocalFallbackStore`]), a durable write into a fixed
//!   directory used when the remote provider stays unreachable.
//!
//! # Naming
//!
//! Both stores reduce the caller's filename to a bare, sanitized name (see the `keys`
//! module). Remote objects live at `{folder}/{name}`, fallback files at `{root}/{name}`.
//! Uploading the same name twice overwrites the previous object.

pub mod factory;
pub mod fallback;
pub mod keys;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_fallback_store, create_remote_store};
pub use fallback::{is_fallback_url, url_in_namespace, LocalFallbackStore};
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockRemoteStore;
#[cfg(feature = "storage-s3")]
pub use remote::S3RemoteStore;
pub use remote::{MemoryRemoteStore, ObjectRemoteStore};
pub use stowage_core::RemoteBackend;
pub use traits::{RemoteStore, StorageError, StorageResult};
