//! Per-category upload entry points.
//!
//! Each entry point validates the payload against the folder's limits, then hands it to
//! the [`UploadOrchestrator`] with the folder's default resource kind.

use bytes::Bytes;
use stowage_core::{AppError, Config, TargetFolder, UploadRequest, UploadResult, UploadValidator};

use super::orchestrator::UploadOrchestrator;
use crate::document::extract_text_async;

/// A stored document together with its best-effort extracted text.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub result: UploadResult,
    pub text: Option<String>,
}

#[derive(Clone)]
pub struct MediaUploadService {
    orchestrator: UploadOrchestrator,
    config: Config,
}

impl MediaUploadService {
    pub fn new(orchestrator: UploadOrchestrator, config: Config) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    pub fn orchestrator(&self) -> &UploadOrchestrator {
        &self.orchestrator
    }

    /// Upload a PDF, extracting its text afterwards when `extract_text` is set.
    ///
    /// Extraction parses the whole document on the blocking pool, so callers that do not
    /// need the text should leave it off.
    pub async fn upload_document(
        &self,
        buffer: Bytes,
        filename: &str,
        extract_text: bool,
    ) -> Result<DocumentUpload, AppError> {
        let result = self
            .upload(buffer.clone(), filename, TargetFolder::Documents)
            .await?;
        let text = if extract_text {
            extract_text_async(buffer).await
        } else {
            None
        };
        Ok(DocumentUpload { result, text })
    }

    pub async fn upload_audio(&self, buffer: Bytes, filename: &str) -> Result<UploadResult, AppError> {
        self.upload(buffer, filename, TargetFolder::Audios).await
    }

    pub async fn upload_profile_image(
        &self,
        buffer: Bytes,
        filename: &str,
    ) -> Result<UploadResult, AppError> {
        self.upload(buffer, filename, TargetFolder::Profiles).await
    }

    pub async fn upload_room_image(
        &self,
        buffer: Bytes,
        filename: &str,
    ) -> Result<UploadResult, AppError> {
        self.upload(buffer, filename, TargetFolder::RoomImages).await
    }

    /// Validate and upload into `folder`.
    pub async fn upload(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
    ) -> Result<UploadResult, AppError> {
        let request = UploadRequest::new(buffer, filename, folder);

        UploadValidator::for_folder(&self.config, folder)
            .validate_request(&request)
            .map_err(|e| {
                tracing::debug!(
                    filename = %filename,
                    folder = %folder,
                    error = %e,
                    "Upload rejected by validation"
                );
                AppError::from(e)
            })?;

        tracing::info!(
            filename = %filename,
            folder = %folder,
            size_kb = request.size_kb(),
            "Uploading {}",
            folder.media_type_name()
        );

        let result = self.orchestrator.upload_request(&request).await?;
        Ok(result)
    }
}
