//! Image Quality Assessor
//!
//! Scores a photo for OCR usability: sharpness (Laplacian variance),
//! brightness (mean luminance), contrast (luminance standard deviation) and
//! clipping (share of near-black / near-white pixels).
//!
//! The report is advisory. A broken assessment reports an acceptable image
//! with the error recorded in the metrics, so intake is never blocked here.

use image::GrayImage;
use imageproc::filter::laplacian_filter;
use serde::Serialize;

use super::raw::RawImage;

/// Laplacian variance below this reads as blurred
const MIN_SHARPNESS: f64 = 120.0;
/// Luminance standard deviation below this reads as washed out
const MIN_CONTRAST: f64 = 25.0;
const MIN_BRIGHTNESS: f64 = 60.0;
const MAX_BRIGHTNESS: f64 = 200.0;
/// Luminance below/above these counts as clipped
const NEAR_BLACK: u8 = 8;
const NEAR_WHITE: u8 = 247;
/// Clipped share that triggers a warning
const MAX_CLIPPED_FRACTION: f64 = 0.20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub sharpness: f64,
    pub mean_brightness: f64,
    pub std_contrast: f64,
    pub dark_fraction: f64,
    pub bright_fraction: f64,
    /// Set when the assessment itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub is_acceptable: bool,
    pub reasons: Vec<String>,
    pub metrics: QualityMetrics,
}

impl QualityReport {
    /// Report for an image that could not be assessed
    fn unassessed(error: impl Into<String>) -> Self {
        Self {
            is_acceptable: true,
            reasons: Vec::new(),
            metrics: QualityMetrics {
                error: Some(error.into()),
                ..QualityMetrics::default()
            },
        }
    }
}

/// Assess a decoded photo
pub fn assess(raw: &RawImage) -> QualityReport {
    let gray = raw.oriented().to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return QualityReport::unassessed("image has no pixels");
    }

    let metrics = measure(&gray);
    let reasons = reasons_for(&metrics);

    tracing::debug!(
        sharpness = metrics.sharpness,
        mean = metrics.mean_brightness,
        std = metrics.std_contrast,
        reasons = reasons.len(),
        "Assessed certificate photo"
    );

    QualityReport {
        is_acceptable: reasons.is_empty(),
        reasons,
        metrics,
    }
}

/// Assess raw photo bytes; undecodable input is reported, never raised
pub fn assess_bytes(bytes: &[u8]) -> QualityReport {
    match RawImage::from_bytes(bytes) {
        Ok(raw) => assess(&raw),
        Err(e) => QualityReport::unassessed(e.to_string()),
    }
}

fn measure(gray: &GrayImage) -> QualityMetrics {
    let total = (gray.width() as f64) * (gray.height() as f64);

    let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
    let (mut dark, mut bright) = (0u64, 0u64);
    for pixel in gray.pixels() {
        let value = pixel.0[0];
        let v = value as f64;
        sum += v;
        sum_sq += v * v;
        if value < NEAR_BLACK {
            dark += 1;
        }
        if value > NEAR_WHITE {
            bright += 1;
        }
    }
    let mean = sum / total;
    let variance = (sum_sq / total - mean * mean).max(0.0);

    QualityMetrics {
        sharpness: laplacian_variance(gray),
        mean_brightness: mean,
        std_contrast: variance.sqrt(),
        dark_fraction: dark as f64 / total,
        bright_fraction: bright as f64 / total,
        error: None,
    }
}

fn laplacian_variance(gray: &GrayImage) -> f64 {
    let laplacian = laplacian_filter(gray);
    let count = laplacian.pixels().len() as f64;
    if count == 0.0 {
        return 0.0;
    }

    let (sum, sum_sq) = laplacian.pixels().fold((0.0f64, 0.0f64), |(s, sq), p| {
        let v = p.0[0] as f64;
        (s + v, sq + v * v)
    });
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

fn reasons_for(metrics: &QualityMetrics) -> Vec<String> {
    let checks: [(bool, &str); 6] = [
        (
            metrics.sharpness < MIN_SHARPNESS,
            "Posible desenfoque (baja nitidez).",
        ),
        (
            metrics.std_contrast < MIN_CONTRAST,
            "Bajo contraste (texto tenue).",
        ),
        (
            metrics.mean_brightness < MIN_BRIGHTNESS,
            "Muy oscuro (baja iluminación).",
        ),
        (
            metrics.mean_brightness > MAX_BRIGHTNESS,
            "Muy claro (sobreexpuesto).",
        ),
        (
            metrics.dark_fraction > MAX_CLIPPED_FRACTION,
            "Demasiadas zonas negras (subexpuesto).",
        ),
        (
            metrics.bright_fraction > MAX_CLIPPED_FRACTION,
            "Demasiadas zonas blancas (sobreexpuesto/reflejos).",
        ),
    ];

    checks
        .into_iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, reason)| reason.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Luma};

    fn raw(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> RawImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)]));
        RawImage::from_image(DynamicImage::ImageLuma8(img), 1)
    }

    #[test]
    fn test_sharp_balanced_image_is_acceptable() {
        let report = assess(&raw(40, 40, |x, y| if (x + y) % 2 == 0 { 60 } else { 200 }));
        assert!(report.is_acceptable, "reasons: {:?}", report.reasons);
        assert!(report.reasons.is_empty());
        assert!((report.metrics.mean_brightness - 130.0).abs() < 0.5);
        assert!(report.metrics.sharpness > MIN_SHARPNESS);
    }

    #[test]
    fn test_flat_gray_is_blurred_and_low_contrast() {
        let report = assess(&raw(32, 32, |_, _| 128));
        assert!(!report.is_acceptable);
        assert_eq!(
            report.reasons,
            vec![
                "Posible desenfoque (baja nitidez).".to_string(),
                "Bajo contraste (texto tenue).".to_string(),
            ]
        );
    }

    #[test]
    fn test_dark_and_clipped() {
        let report = assess(&raw(20, 20, |_, _| 3));
        assert!(report.reasons.iter().any(|r| r.starts_with("Muy oscuro")));
        assert!(report.reasons.iter().any(|r| r.starts_with("Demasiadas zonas negras")));
        assert!((report.metrics.dark_fraction - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overexposed() {
        let report = assess(&raw(20, 20, |_, _| 250));
        assert!(report.reasons.iter().any(|r| r.starts_with("Muy claro")));
        assert!(report.reasons.iter().any(|r| r.starts_with("Demasiadas zonas blancas")));
    }

    #[test]
    fn test_undecodable_bytes_never_block() {
        let report = assess_bytes(b"\x00\x01garbage");
        assert!(report.is_acceptable);
        assert!(report.reasons.is_empty());
        assert!(report.metrics.error.is_some());

        let report = assess_bytes(&[]);
        assert!(report.is_acceptable);
        assert!(report.metrics.error.is_some());
    }

    #[test]
    fn test_acceptable_iff_no_reasons() {
        let samples = [
            raw(16, 16, |_, _| 0),
            raw(16, 16, |x, _| (x * 16) as u8),
            raw(1, 1, |_, _| 100),
            raw(40, 40, |x, y| if (x + y) % 2 == 0 { 60 } else { 200 }),
        ];
        for sample in &samples {
            let report = assess(sample);
            assert_eq!(report.is_acceptable, report.reasons.is_empty());
        }
    }
}
