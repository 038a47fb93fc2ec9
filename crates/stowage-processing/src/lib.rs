//! Stowage Processing Library
//!
//! The upload orchestration layer: bounded retries against the remote store, a durable
//! local fallback once retries are exhausted, per-category upload entry points and
//! best-effort text extraction for uploaded documents.

pub mod document;
pub mod upload;

pub use document::{extract_text, extract_text_async};
pub use upload::{
    AttemptState, DocumentUpload, MediaUploadService, RetryPolicy, RetryState, UploadError,
    UploadOrchestrator,
};
