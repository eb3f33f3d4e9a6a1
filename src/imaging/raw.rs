//! Raw certificate photo loading

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum accepted photo size (20MB)
const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;

/// Image decoding and encoding errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Decoded photo plus its EXIF orientation
///
/// Owned by the caller for one processing request; never persisted.
#[derive(Debug, Clone)]
pub struct RawImage {
    image: DynamicImage,
    /// EXIF orientation tag, 1 (upright) when absent
    orientation: u32,
    format: Option<ImageFormat>,
}

impl RawImage {
    /// Decode photo bytes in any supported format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::EmptyData);
        }
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
        }

        let format = image::guess_format(bytes).ok();
        let image =
            image::load_from_memory(bytes).map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

        Ok(Self {
            image,
            orientation: read_exif_orientation(bytes),
            format,
        })
    }

    /// Wrap an already decoded bitmap
    pub fn from_image(image: DynamicImage, orientation: u32) -> Self {
        Self {
            image,
            orientation,
            format: None,
        }
    }

    pub fn orientation(&self) -> u32 {
        self.orientation
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Upright copy with the EXIF orientation applied
    pub fn oriented(&self) -> DynamicImage {
        apply_orientation(self.image.clone(), self.orientation)
    }
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
