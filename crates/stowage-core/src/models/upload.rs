use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage folder an upload is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFolder {
    Documents,
    Audios,
    Profiles,
    RoomImages,
}

impl TargetFolder {
    pub const ALL: [TargetFolder; 4] = [
        TargetFolder::Documents,
        TargetFolder::Audios,
        TargetFolder::Profiles,
        TargetFolder::RoomImages,
    ];

    /// Folder name used on the remote provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFolder::Documents => "documents",
            TargetFolder::Audios => "audios",
            TargetFolder::Profiles => "profiles",
            TargetFolder::RoomImages => "room_images",
        }
    }

    /// Resource kind requested from the provider when the caller does not pick one.
    pub fn default_resource_kind(&self) -> ResourceKind {
        match self {
            TargetFolder::Documents => ResourceKind::Raw,
            TargetFolder::Audios => ResourceKind::Audio,
            TargetFolder::Profiles | TargetFolder::RoomImages => ResourceKind::Image,
        }
    }

    /// Human readable name for log lines and validation messages.
    pub fn media_type_name(&self) -> &'static str {
        match self {
            TargetFolder::Documents => "document",
            TargetFolder::Audios => "audio",
            TargetFolder::Profiles => "profile image",
            TargetFolder::RoomImages => "room image",
        }
    }
}

impl FromStr for TargetFolder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "documents" | "document" => Ok(TargetFolder::Documents),
            "audios" | "audio" => Ok(TargetFolder::Audios),
            "profiles" | "profile" => Ok(TargetFolder::Profiles),
            "room_images" | "room_image" => Ok(TargetFolder::RoomImages),
            _ => Err(anyhow::anyhow!("Invalid target folder: {}", s)),
        }
    }
}

impl Display for TargetFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Provider-side classification of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Raw,
    Image,
    Audio,
    Auto,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Raw => "raw",
            ResourceKind::Image => "image",
            ResourceKind::Audio => "audio",
            ResourceKind::Auto => "auto",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(ResourceKind::Raw),
            "image" => Ok(ResourceKind::Image),
            "audio" => Ok(ResourceKind::Audio),
            "auto" => Ok(ResourceKind::Auto),
            _ => Err(anyhow::anyhow!("Unsupported resource kind: {}", s)),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An in-memory payload handed to the pipeline by the upload layer.
///
/// The filename is only used for naming. It is never trusted as a path: stores
/// reduce it to a bare name before touching disk or building object keys.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub buffer: Bytes,
    pub filename: String,
    pub target_folder: TargetFolder,
    pub resource_kind: ResourceKind,
}

impl UploadRequest {
    /// Build a request using the folder's default resource kind.
    pub fn new(
        buffer: impl Into<Bytes>,
        filename: impl Into<String>,
        target_folder: TargetFolder,
    ) -> Self {
        Self {
            buffer: buffer.into(),
            filename: filename.into(),
            target_folder,
            resource_kind: target_folder.default_resource_kind(),
        }
    }

    pub fn with_resource_kind(mut self, resource_kind: ResourceKind) -> Self {
        self.resource_kind = resource_kind;
        self
    }

    pub fn size_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Size rounded to the nearest kilobyte, as shown in upload log lines.
    pub fn size_kb(&self) -> u64 {
        (self.buffer.len() as f64 / 1024.0).round() as u64
    }
}

/// Canonical upload outcome, identical in shape whichever store produced it.
///
/// Field names on the wire follow the remote provider's response so existing
/// consumers keep working. `is_fallback` is set only by the local fallback store;
/// callers branch on it to schedule a later re-sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub secure_url: String,
    pub public_id: String,
    pub resource_type: String,
    #[serde(rename = "bytes")]
    pub byte_size: u64,
    pub format: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_fallback: bool,
}
