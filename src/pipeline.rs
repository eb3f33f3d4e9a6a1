//! Certificate processing pipeline
//!
//! One request in, one outcome out:
//! decode -> quality -> normalise -> OCR fallback -> date range ->
//! observations -> notices -> archival copy and filename.
//!
//! Nothing here returns an error. Every stage degrades to an empty or
//! pass-through value so the absence record is always written.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::archive::{archive_filename, ArchivalStore, ArchiveError};
use crate::config::{Config, ImageConfig};
use crate::employee::Employee;
use crate::extract::ExtractionResult;
use crate::imaging::{self, PreparedImages, QualityReport, RawImage};
use crate::motive::AbsenceMotive;
use crate::ocr::OcrService;
use crate::validation::{CertificateDeadline, ValidationInput, ValidationOutcome};

/// One certificate photo plus the notice it belongs to
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    /// Photo bytes as received
    pub image: Vec<u8>,
    /// Employee who filed the notice, as resolved from the directory
    pub employee: Employee,
    pub motive: AbsenceMotive,
    pub notice_at: NaiveDateTime,
    pub received_at: NaiveDateTime,
}

/// Everything produced for one certificate
#[derive(Debug, Clone, Serialize)]
pub struct CertificateOutcome {
    pub extraction: ExtractionResult,
    pub quality: QualityReport,
    pub validation: ValidationOutcome,
    pub deadline: CertificateDeadline,
    pub archive_filename: String,
    /// Compressed copy for the archival store
    #[serde(skip)]
    pub archival_copy: Vec<u8>,
}

impl CertificateOutcome {
    /// Hand the archival copy to a store, returning its link
    pub async fn archive(
        &self,
        store: &dyn ArchivalStore,
        destination: &str,
    ) -> Result<String, ArchiveError> {
        if self.archival_copy.is_empty() {
            return Err(ArchiveError::EmptyPayload);
        }
        let link = store
            .store(&self.archival_copy, &self.archive_filename, destination)
            .await?;
        tracing::info!(filename = %self.archive_filename, link = %link, "Certificate archived");
        Ok(link)
    }
}

/// Pixel work for one photo
struct ImagingOutput {
    quality: QualityReport,
    prepared: PreparedImages,
    archival: Vec<u8>,
}

/// Certificate processor
pub struct CertificateProcessor {
    config: Config,
    ocr: OcrService,
}

impl CertificateProcessor {
    pub fn new(config: Config) -> Self {
        let ocr = OcrService::new(&config.ocr);
        Self { config, ocr }
    }

    /// Use a pre-built OCR service (custom providers, tests)
    pub fn with_ocr(config: Config, ocr: OcrService) -> Self {
        Self { config, ocr }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one certificate end to end
    pub async fn process(&self, request: &CertificateRequest) -> CertificateOutcome {
        let imaging = self.run_imaging(&request.image).await;

        let extraction = self.ocr.extract(&imaging.prepared).await;

        let validation = ValidationOutcome::evaluate(&ValidationInput {
            extraction: &extraction,
            motive: request.motive,
            employee_identity: &request.employee.identity_number,
            notice_at: request.notice_at,
            received_at: request.received_at,
            quality: Some(&imaging.quality),
            rules: &self.config.rules,
        });

        let named_date = extraction
            .issuance_date
            .unwrap_or_else(|| request.notice_at.date());

        CertificateOutcome {
            deadline: CertificateDeadline::for_notice(request.notice_at, &self.config.rules),
            archive_filename: archive_filename(named_date, &request.employee),
            archival_copy: imaging.archival,
            quality: imaging.quality,
            extraction,
            validation,
        }
    }

    /// Decode, score and derive copies off the async runtime
    async fn run_imaging(&self, source: &[u8]) -> ImagingOutput {
        let bytes = source.to_vec();
        let config = self.config.image.clone();

        match tokio::task::spawn_blocking(move || prepare_images(&bytes, &config)).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "Image preparation task failed, passing photo through");
                ImagingOutput {
                    quality: imaging::assess_bytes(&[]),
                    prepared: PreparedImages::passthrough(source),
                    archival: source.to_vec(),
                }
            }
        }
    }
}

fn prepare_images(bytes: &[u8], config: &ImageConfig) -> ImagingOutput {
    let raw = match RawImage::from_bytes(bytes) {
        Ok(raw) => Some(raw),
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode certificate photo");
            None
        }
    };

    let quality = match &raw {
        Some(raw) => imaging::assess(raw),
        None => imaging::assess_bytes(bytes),
    };

    let archival = raw
        .as_ref()
        .and_then(|raw| match imaging::archival_copy(raw, config) {
            Ok(copy) => Some(copy),
            Err(e) => {
                tracing::warn!(error = %e, "Archival copy failed, archiving original");
                None
            }
        })
        .unwrap_or_else(|| bytes.to_vec());

    ImagingOutput {
        quality,
        prepared: PreparedImages::prepare(bytes, raw.as_ref(), config),
        archival,
    }
}
