//! Image payload and upload sizing.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Raster formats recognised when building inline image sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Payload of an image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// Opaque URL or blob reference, resolved by the rendering side.
    pub source: String,
}

impl ImageData {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Build an inline `data:` source from encoded file bytes.
    ///
    /// Returns `None` when the bytes are not a recognised raster format.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        Some(Self::new(format!(
            "data:{};base64,{}",
            format.mime_type(),
            STANDARD.encode(data)
        )))
    }
}

/// Shrink `natural` to fit inside `max`, preserving aspect ratio.
///
/// Images already inside the box keep their natural size.
pub fn fit_within(natural: Size, max: Size) -> Size {
    let mut width = natural.width;
    let mut height = natural.height;
    if width <= 0.0 || height <= 0.0 {
        return Size::new(width.max(0.0), height.max(0.0));
    }
    if width > max.width {
        height = height * max.width / width;
        width = max.width;
    }
    if height > max.height {
        width = width * max.height / height;
        height = max.height;
    }
    Size::new(width, height)
}
