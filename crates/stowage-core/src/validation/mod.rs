//! Caller-side upload validation
//!
//! The orchestrator does not re-validate its input: empty buffers, missing filenames
//! and unsupported file types are rejected here, before a request is handed to it.

use std::path::Path;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{TargetFolder, UploadRequest};

/// Common validation errors for uploaded files
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Upload validator for a single target folder
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Validator with the configured limits of `folder`.
    pub fn for_folder(config: &Config, folder: TargetFolder) -> Self {
        Self::new(
            config.max_size_bytes(folder),
            config.allowed_extensions(folder).to_vec(),
        )
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidFilename(
                "filename is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// An empty allowlist accepts every extension.
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_all(&self, filename: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_filename(filename)?;
        self.validate_extension(filename)?;
        Ok(())
    }

    pub fn validate_request(&self, request: &UploadRequest) -> Result<(), ValidationError> {
        self.validate_all(&request.filename, request.size_bytes())
    }
}
