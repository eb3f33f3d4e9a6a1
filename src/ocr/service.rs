//! OCR Service
//!
//! Runs the configured providers in order and keeps the first one whose
//! text yields at least one certificate field.

use std::sync::Arc;
use std::time::Duration;

use super::{
    provider::TextExtractionProvider,
    tesseract::TesseractProvider,
    text::normalize_text,
    types::{ProviderError, ProviderKind, RecognizedText},
    vision::VisionProvider,
};
use crate::config::OcrConfig;
use crate::extract::ExtractionResult;
use crate::imaging::PreparedImages;

/// Provider fallback orchestrator
pub struct OcrService {
    providers: Vec<Arc<dyn TextExtractionProvider>>,
    timeout: Duration,
}

impl OcrService {
    /// Build the provider list from configuration
    ///
    /// The cloud provider is left out entirely when no API key is configured.
    pub fn new(config: &OcrConfig) -> Self {
        let mut providers: Vec<Arc<dyn TextExtractionProvider>> = Vec::new();

        for kind in config.preference.order() {
            match kind {
                ProviderKind::Vision => match config.vision_api_key.as_deref() {
                    Some(key) => providers.push(Arc::new(VisionProvider::new(
                        &config.vision_endpoint,
                        key,
                        VisionProvider::hint_for(&config.language),
                    ))),
                    None => {
                        tracing::debug!("No vision API key configured, skipping cloud provider")
                    }
                },
                ProviderKind::Tesseract => providers.push(Arc::new(TesseractProvider::new(
                    &config.tesseract_cmd,
                    &config.language,
                ))),
            }
        }

        Self {
            providers,
            timeout: config.timeout(),
        }
    }

    /// Use an explicit provider list, in order
    pub fn with_providers(providers: Vec<Arc<dyn TextExtractionProvider>>) -> Self {
        Self {
            providers,
            timeout: OcrConfig::default().timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Provider order this service will try
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Extract certificate fields, falling back across providers
    ///
    /// Never fails: when no provider produces a field the result is empty.
    pub async fn extract(&self, images: &PreparedImages) -> ExtractionResult {
        for provider in &self.providers {
            let kind = provider.kind();
            let input = images.for_variant(provider.variant());

            match self.call(provider.as_ref(), input).await {
                Ok(recognized) => {
                    let text = normalize_text(&recognized.full_text);
                    let result = ExtractionResult::from_text(&text, &recognized.tokens);
                    if result.has_any_field() {
                        tracing::info!(
                            provider = %kind,
                            identity = result.identity_number.is_some(),
                            rest_days = ?result.rest_days,
                            issuance_date = ?result.issuance_date,
                            "Certificate fields extracted"
                        );
                        return result.with_provider(kind);
                    }
                    tracing::warn!(provider = %kind, "No certificate fields in OCR text, trying next");
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "OCR provider failed, trying next");
                }
            }
        }

        tracing::warn!("No OCR provider produced certificate fields");
        ExtractionResult::default()
    }

    async fn call(
        &self,
        provider: &dyn TextExtractionProvider,
        input: &[u8],
    ) -> Result<RecognizedText, ProviderError> {
        match tokio::time::timeout(self.timeout, provider.extract(input)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }
}
