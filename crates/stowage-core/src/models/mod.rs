//! Data models for the upload pipeline
//!
//! `upload` holds the request/result records that cross the pipeline boundary;
//! `response` holds the envelope the HTTP layer wraps them in.

mod response;
mod upload;

pub use response::ResponseEnvelope;
pub use upload::{ResourceKind, TargetFolder, UploadRequest, UploadResult};
