//! Imaging
//!
//! Everything that touches pixels: decoding the photographed certificate,
//! advisory quality scoring, and the derived copies for archive and OCR.

mod normalize;
mod quality;
mod raw;

pub use normalize::{archival_copy, natural_copy, recognition_copy, PreparedImages};
pub use quality::{assess, assess_bytes, QualityMetrics, QualityReport};
pub use raw::{apply_orientation, read_exif_orientation, ImageError, RawImage};
