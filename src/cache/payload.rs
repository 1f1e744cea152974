//! Image payloads handed to the renderer.

use std::fmt;
use std::sync::Arc;

use super::key::TemplateKey;
use crate::error::{MemeError, Result};

/// Image container formats recognized by their leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl ImageFormat {
    /// Sniff the format from the first bytes of a buffer.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'B', b'M', ..] => Some(Self::Bmp),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(Self::Tiff),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A template image ready for rendering.
///
/// The bytes are shared, so cloning a payload out of the memory cache does
/// not copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    origin: TemplateKey,
    format: ImageFormat,
    bytes: Arc<[u8]>,
}

impl ImagePayload {
    /// Validate raw bytes as an image and wrap them.
    pub fn decode(origin: TemplateKey, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| MemeError::UnsupportedImage {
            origin: origin.to_string(),
        })?;

        Ok(Self {
            origin,
            format,
            bytes,
        })
    }

    /// The key this image was resolved from.
    pub fn origin(&self) -> &TemplateKey {
        &self.origin
    }

    /// The detected image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel dimensions, when cheaply readable from the header (PNG and GIF).
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let b = &self.bytes;
        match self.format {
            ImageFormat::Png if b.len() >= 24 => Some((
                u32::from_be_bytes([b[16], b[17], b[18], b[19]]),
                u32::from_be_bytes([b[20], b[21], b[22], b[23]]),
            )),
            ImageFormat::Gif if b.len() >= 10 => Some((
                u16::from_le_bytes([b[6], b[7]]) as u32,
                u16::from_le_bytes([b[8], b[9]]) as u32,
            )),
            _ => None,
        }
    }
}
