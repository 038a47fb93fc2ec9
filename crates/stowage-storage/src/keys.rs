//! Shared naming helpers for the remote and fallback stores.
//!
//! Filenames come from the upload layer and are never trusted as paths: every store
//! goes through [`sanitize_filename`] before building a key or a filesystem path.

use std::path::Path;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use stowage_core::constants::{FALLBACK_DEFAULT_FORMAT, FALLBACK_DEFAULT_RESOURCE_TYPE};
use stowage_core::{ResourceKind, TargetFolder};

use crate::traits::{StorageError, StorageResult};

/// Longest sanitized name, in bytes (the usual filesystem limit).
const MAX_FILENAME_LENGTH: usize = 255;

/// Reduce `filename` to a bare name safe to use as an object key segment or file name.
///
/// Directory components (either separator style) are dropped. Letters and digits of any
/// script are kept along with `.`, `-` and `_`; every other character (including `%`) is
/// percent-encoded, so distinct bare names always map to distinct sanitized names.
/// Names made only of dots, and names too long to encode, are rejected.
pub fn sanitize_filename(filename: &str) -> StorageResult<String> {
    let normalized = filename.replace('\\', "/");
    let bare = normalized
        .rsplit('/')
        .next()
        .unwrap_or(normalized.as_str())
        .trim();

    if bare.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "Filename has no name component: {:?}",
            filename
        )));
    }

    if bare.chars().all(|c| c == '.') {
        return Err(StorageError::InvalidKey(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let mut sanitized = String::with_capacity(bare.len());
    let mut buf = [0u8; 4];
    for c in bare.chars() {
        if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
            sanitized.push(c);
        } else {
            let encoded = c.encode_utf8(&mut buf);
            sanitized.extend(utf8_percent_encode(encoded, NON_ALPHANUMERIC));
        }
    }

    if sanitized.len() > MAX_FILENAME_LENGTH {
        return Err(StorageError::InvalidKey(format!(
            "Filename is too long ({} bytes once encoded, max {})",
            sanitized.len(),
            MAX_FILENAME_LENGTH
        )));
    }

    Ok(sanitized)
}

/// Name without its extension (`report.pdf` -> `report`).
pub fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

/// Lowercased extension without the dot, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Remote object key: `{folder}/{sanitized filename}`.
pub fn generate_object_key(folder: TargetFolder, sanitized_filename: &str) -> String {
    format!("{}/{}", folder.as_str(), sanitized_filename)
}

/// Format reported in result records: the extension, or `bin` without one.
pub fn result_format(filename: &str) -> String {
    file_extension(filename).unwrap_or_else(|| FALLBACK_DEFAULT_FORMAT.to_string())
}

/// Resource type the provider reports back for an upload.
///
/// Audio is stored as `video`, the way media providers classify sound files.
/// `auto` is resolved from the extension.
pub fn provider_resource_type(kind: ResourceKind, filename: &str) -> &'static str {
    match kind {
        ResourceKind::Raw => FALLBACK_DEFAULT_RESOURCE_TYPE,
        ResourceKind::Image => "image",
        ResourceKind::Audio => "video",
        ResourceKind::Auto => match file_extension(filename).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "avif" | "bmp" | "svg" | "ico") => {
                "image"
            }
            Some(
                "mp3" | "wav" | "ogg" | "m4a" | "flac" | "aac" | "mp4" | "mov" | "webm" | "mkv"
                | "avi",
            ) => "video",
            _ => FALLBACK_DEFAULT_RESOURCE_TYPE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("clip.mp3").unwrap(), "clip.mp3");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\report.pdf").unwrap(),
            "report.pdf"
        );
        assert_eq!(
            sanitize_filename("my report (1).pdf").unwrap(),
            "my%20report%20%281%29.pdf"
        );
    }

    #[test]
    fn sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_filename("合同.pdf").unwrap(), "合同.pdf");
        assert_eq!(sanitize_filename("résumé.pdf").unwrap(), "résumé.pdf");
    }

    #[test]
    fn distinct_names_stay_distinct() {
        let names = [
            "合同.pdf",
            "发票.pdf",
            "résumé.pdf",
            "r_sum_.pdf",
            "a b.png",
            "a_b.png",
            "a%20b.png",
            "a+b.png",
        ];
        let sanitized: Vec<String> = names
            .iter()
            .map(|n| sanitize_filename(n).unwrap())
            .collect();
        for (i, a) in sanitized.iter().enumerate() {
            for b in &sanitized[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn overlong_names_are_rejected() {
        let name = format!("{}.pdf", "x".repeat(300));
        assert!(matches!(
            sanitize_filename(&name),
            Err(StorageError::InvalidKey(_))
        ));
        let emoji = format!("{}.png", "\u{1F600}".repeat(30));
        assert!(sanitize_filename(&emoji).is_err());
    }

    #[test]
    fn sanitize_rejects_traversal_and_empty_names() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/..").is_err());
        assert!(sanitize_filename("uploads/").is_err());
        assert!(sanitize_filename("").is_err());
    }

    #[test]
    fn stem_and_extension() {
        assert_eq!(file_stem("report.pdf"), "report");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(file_extension("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(result_format("README"), "bin");
    }

    #[test]
    fn object_keys_are_folder_scoped() {
        assert_eq!(
            generate_object_key(TargetFolder::RoomImages, "room.png"),
            "room_images/room.png"
        );
    }

    #[test]
    fn auto_resource_type_follows_extension() {
        assert_eq!(provider_resource_type(ResourceKind::Auto, "a.png"), "image");
        assert_eq!(provider_resource_type(ResourceKind::Auto, "a.mp3"), "video");
        assert_eq!(provider_resource_type(ResourceKind::Auto, "a.pdf"), "raw");
        assert_eq!(provider_resource_type(ResourceKind::Audio, "a.pdf"), "video");
        assert_eq!(provider_resource_type(ResourceKind::Raw, "a.png"), "raw");
    }
}
