//! Resilient upload flow: retry policy, orchestrator and per-category service

pub mod orchestrator;
pub mod retry;
pub mod service;

pub use orchestrator::{UploadError, UploadOrchestrator};
pub use retry::{AttemptState, RetryPolicy, RetryState};
pub use service::{DocumentUpload, MediaUploadService};
