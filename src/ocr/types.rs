//! OCR Types
//!
//! Defines the provider vocabulary shared by the extraction backends.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Text extraction backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Cloud vision service (Google Cloud Vision)
    Vision,
    /// Local Tesseract engine
    Tesseract,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vision => f.write_str("vision"),
            Self::Tesseract => f.write_str("tesseract"),
        }
    }
}

/// Configured provider preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrPreference {
    /// Cloud first, then local
    #[default]
    Auto,
    Vision,
    Tesseract,
}

impl OcrPreference {
    /// Provider order implied by the preference
    pub fn order(&self) -> [ProviderKind; 2] {
        match self {
            Self::Auto | Self::Vision => [ProviderKind::Vision, ProviderKind::Tesseract],
            Self::Tesseract => [ProviderKind::Tesseract, ProviderKind::Vision],
        }
    }
}

impl FromStr for OcrPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "vision" => Ok(Self::Vision),
            "tesseract" => Ok(Self::Tesseract),
            other => Err(format!("unknown OCR provider preference: {}", other)),
        }
    }
}

/// Which derived image a provider consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    /// Binarised grayscale copy tuned for classic OCR engines
    Recognition,
    /// Lightly re-encoded colour copy for models trained on natural images
    Natural,
}

/// Recognised text fragment with its pixel box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
        }
    }

    /// Lower pixel edge of the box
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

/// Output of a single provider call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecognizedText {
    pub full_text: String,
    pub tokens: Vec<PositionedToken>,
}

/// Provider failure taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("OCR provider not available: {0}")]
    NotAvailable(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Quota exhausted: {0}")]
    Quota(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("OCR processing failed: {0}")]
    Processing(String),

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),
}
