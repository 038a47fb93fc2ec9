//! Stowage Core Library
//!
//! This crate provides the domain models, error types, configuration and caller-side
//! validation shared by the storage, processing and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, UploadPipelineConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ResourceKind, ResponseEnvelope, TargetFolder, UploadRequest, UploadResult};
pub use storage_types::RemoteBackend;
pub use validation::{UploadValidator, ValidationError};
