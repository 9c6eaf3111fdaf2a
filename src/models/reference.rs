use std::sync::Arc;

use crate::error::{ComicError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

/// The uploaded reference image. Validated once, then shared read-only
/// across every panel request of a run.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    bytes: Arc<Vec<u8>>,
    format: ImageFormat,
}

impl ReferenceImage {
    /// Accepts JPEG, PNG or WebP, identified by magic bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = detect_format(&bytes).ok_or_else(|| {
            ComicError::Validation(
                "Please upload a valid image file (JPG, PNG, or WebP)".into(),
            )
        })?;

        Ok(Self {
            bytes: Arc::new(bytes),
            format,
        })
    }

    pub fn bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageFormat::Png)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_known_formats() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(
            ReferenceImage::from_bytes(jpeg).unwrap().format(),
            ImageFormat::Jpeg
        );

        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(
            ReferenceImage::from_bytes(png).unwrap().format(),
            ImageFormat::Png
        );

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(
            ReferenceImage::from_bytes(webp).unwrap().format(),
            ImageFormat::Webp
        );
    }

    #[test]
    fn test_rejects_unknown_bytes() {
        assert!(ReferenceImage::from_bytes(vec![]).is_err());
        assert!(ReferenceImage::from_bytes(b"GIF89a".to_vec()).is_err());
    }
}
