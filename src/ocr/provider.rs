//! OCR Providers
//!
//! Defines the contract every text extraction backend implements.

use async_trait::async_trait;

use super::types::{ImageVariant, ProviderError, ProviderKind, RecognizedText};

/// Text extraction provider trait
#[async_trait]
pub trait TextExtractionProvider: Send + Sync {
    /// Get the provider type
    fn kind(&self) -> ProviderKind;

    /// Which normalised image this provider should receive
    fn variant(&self) -> ImageVariant;

    /// Extract full text plus positioned tokens from an encoded image
    async fn extract(&self, image_data: &[u8]) -> Result<RecognizedText, ProviderError>;
}
