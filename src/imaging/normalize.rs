//! Image Normalizer
//!
//! Derives the copies a certificate photo travels as:
//! - archival: RGB, longest side capped, lossy JPEG, storage only
//! - recognition: upscaled, contrast-stretched, despeckled, binarised PNG
//!   for the local OCR engine
//! - natural: upright colour JPEG for the cloud provider
//!
//! All copies are taken from the orientation-corrected bitmap.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use imageproc::filter::median_filter;

use super::raw::{ImageError, RawImage};
use crate::config::ImageConfig;
use crate::ocr::ImageVariant;

/// Archival copy: downscaled so the longest side fits, re-encoded as JPEG
pub fn archival_copy(raw: &RawImage, config: &ImageConfig) -> Result<Vec<u8>, ImageError> {
    let mut image = DynamicImage::ImageRgb8(raw.oriented().to_rgb8());

    let (width, height) = (image.width(), image.height());
    let longest = width.max(height);
    if longest > config.archive_max_side {
        let ratio = config.archive_max_side as f64 / longest as f64;
        let (new_w, new_h) = scaled(width, height, ratio);
        image = image.resize_exact(new_w, new_h, FilterType::Lanczos3);
    }

    encode_jpeg(&image.to_rgb8(), config.archive_quality)
}

/// Recognition copy for classic OCR engines, encoded as PNG
pub fn recognition_copy(raw: &RawImage, config: &ImageConfig) -> Result<Vec<u8>, ImageError> {
    let mut image = DynamicImage::ImageLuma8(raw.oriented().to_luma8());

    let (width, height) = (image.width(), image.height());
    let longest = width.max(height);
    if longest == 0 {
        return Err(ImageError::EncodeFailed("image has no pixels".to_string()));
    }
    // Never downscale here; small print needs the pixels
    if longest < config.recognition_target_side {
        let ratio = config.recognition_target_side as f64 / longest as f64;
        let (new_w, new_h) = scaled(width, height, ratio);
        image = image.resize_exact(new_w, new_h, FilterType::Lanczos3);
    }

    let mut gray = image.to_luma8();
    autocontrast(&mut gray);
    boost_contrast(&mut gray, config.contrast_factor);

    let radius = config.median_window / 2;
    if radius > 0 {
        gray = median_filter(&gray, radius, radius);
    }
    binarize(&mut gray, config.binarize_threshold);

    let mut output = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(output)
}

/// Colour copy for the cloud provider
pub fn natural_copy(raw: &RawImage, config: &ImageConfig) -> Result<Vec<u8>, ImageError> {
    encode_jpeg(&raw.oriented().to_rgb8(), config.cloud_quality)
}

/// Per-provider inputs derived from one photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImages {
    pub recognition: Vec<u8>,
    pub natural: Vec<u8>,
}

impl PreparedImages {
    /// Build both OCR inputs; any copy that fails falls back to the source bytes
    pub fn prepare(source: &[u8], raw: Option<&RawImage>, config: &ImageConfig) -> Self {
        let Some(raw) = raw else {
            return Self::passthrough(source);
        };

        let recognition = recognition_copy(raw, config).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Recognition copy failed, using source image");
            source.to_vec()
        });
        let natural = natural_copy(raw, config).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Natural copy failed, using source image");
            source.to_vec()
        });

        Self {
            recognition,
            natural,
        }
    }

    /// Undecodable input goes to the providers as-is
    pub fn passthrough(source: &[u8]) -> Self {
        Self {
            recognition: source.to_vec(),
            natural: source.to_vec(),
        }
    }

    pub fn for_variant(&self, variant: ImageVariant) -> &[u8] {
        match variant {
            ImageVariant::Recognition => &self.recognition,
            ImageVariant::Natural => &self.natural,
        }
    }
}

fn scaled(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    (
        ((width as f64 * ratio) as u32).max(1),
        ((height as f64 * ratio) as u32).max(1),
    )
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode_image(image)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(buffer)
}

/// Stretch the darkest pixel to 0 and the brightest to 255
fn autocontrast(gray: &mut GrayImage) {
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if hi <= lo {
        return;
    }

    let scale = 255.0 / (hi - lo) as f32;
    let lut: Vec<u8> = (0..=255u16)
        .map(|v| ((v as f32 - lo as f32) * scale).round().clamp(0.0, 255.0) as u8)
        .collect();
    apply_lut(gray, &lut);
}

/// Push pixels away from the (rounded) mean by `factor`
fn boost_contrast(gray: &mut GrayImage, factor: f32) {
    let total = gray.pixels().len() as f64;
    if total == 0.0 {
        return;
    }
    let sum: f64 = gray.pixels().map(|p| p.0[0] as f64).sum();
    let mean = (sum / total + 0.5).floor() as f32;

    let lut: Vec<u8> = (0..=255u16)
        .map(|v| (mean + factor * (v as f32 - mean)).round().clamp(0.0, 255.0) as u8)
        .collect();
    apply_lut(gray, &lut);
}

fn binarize(gray: &mut GrayImage, threshold: u8) {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
}

fn apply_lut(gray: &mut GrayImage, lut: &[u8]) {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
}
