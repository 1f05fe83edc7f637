//! Validation of uploaded images.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on an uploaded image: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Whether `bytes` start with this format's file signature.
    pub fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            ImageKind::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            ImageKind::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
            ImageKind::Gif => bytes.starts_with(b"GIF8"),
            ImageKind::Webp => bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(&b"WEBP"[..]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    Empty,
    #[error("File too large: {size} bytes (max {max})", max = MAX_UPLOAD_BYTES)]
    TooLarge { size: usize },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),
    #[error("File contents do not match the declared type")]
    SignatureMismatch,
}

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Check size, declared MIME type, file extension and magic bytes.
pub fn validate_upload(
    bytes: &[u8],
    mime: &str,
    file_name: &str,
) -> Result<ImageKind, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: bytes.len() });
    }

    let kind = ImageKind::from_mime(mime)
        .ok_or_else(|| UploadError::UnsupportedType(mime.to_string()))?;

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedExtension(file_name.to_string()));
    }

    if !kind.matches_signature(bytes) {
        return Err(UploadError::SignatureMismatch);
    }
    Ok(kind)
}

/// A collision-free name to store an accepted upload under.
pub fn stored_file_name(kind: ImageKind) -> String {
    format!("{}.{}", Uuid::new_v4(), kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn accepts_matching_png() {
        assert_eq!(validate_upload(PNG, "image/png", "hero.PNG"), Ok(ImageKind::Png));
    }

    #[test]
    fn jpg_alias_accepted() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(validate_upload(&jpeg, "image/jpg", "a.jpeg"), Ok(ImageKind::Jpeg));
    }

    #[test]
    fn webp_needs_marker() {
        let mut webp = b"RIFF\0\0\0\0WEBPVP8 ".to_vec();
        assert_eq!(validate_upload(&webp, "image/webp", "a.webp"), Ok(ImageKind::Webp));
        webp[8] = b'X';
        assert_eq!(
            validate_upload(&webp, "image/webp", "a.webp"),
            Err(UploadError::SignatureMismatch)
        );
        assert_eq!(
            validate_upload(b"RIFF", "image/webp", "a.webp"),
            Err(UploadError::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(validate_upload(&[], "image/png", "a.png"), Err(UploadError::Empty));
        assert!(matches!(
            validate_upload(PNG, "image/svg+xml", "a.svg"),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate_upload(PNG, "image/png", "a.exe"),
            Err(UploadError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            validate_upload(PNG, "image/png", "noextension"),
            Err(UploadError::UnsupportedExtension(_))
        ));
        assert_eq!(
            validate_upload(PNG, "image/gif", "a.gif"),
            Err(UploadError::SignatureMismatch)
        );

        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            validate_upload(&big, "image/png", "a.png"),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn stored_names_are_unique() {
        let a = stored_file_name(ImageKind::Png);
        assert!(a.ends_with(".png"));
        assert_ne!(a, stored_file_name(ImageKind::Png));
    }
}
