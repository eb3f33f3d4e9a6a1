//! OCR Module
//!
//! Turns a certificate photo into text plus positioned tokens, and picks
//! certificate fields out of it.
//!
//! Supports two backends behind one trait:
//! - Google Cloud Vision (remote, needs `GOOGLE_VISION_API_KEY`)
//! - Tesseract (local, requires installation)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use certificate_intake::ocr::OcrService;
//!
//! let service = OcrService::new(&config.ocr);
//! let fields = service.extract(&prepared_images).await;
//! ```

mod provider;
mod service;
mod tesseract;
mod text;
mod types;
mod vision;

pub use provider::TextExtractionProvider;
pub use service::OcrService;
pub use tesseract::TesseractProvider;
pub use text::normalize_text;
pub use types::{
    ImageVariant, OcrPreference, PositionedToken, ProviderError, ProviderKind, RecognizedText,
};
pub use vision::VisionProvider;

#[cfg(test)]
pub(crate) use provider::mock;
