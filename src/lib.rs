//! Certificate Intake
//!
//! Evidence extraction and validation for medical certificates attached to
//! employee absence notices.
//!
//! # Modules
//!
//! - `imaging`: Decoding, quality assessment and OCR/archival normalisation
//! - `ocr`: Text extraction providers (cloud vision, local tesseract) and the fallback orchestrator
//! - `extract`: Heuristic field parsers (identity number, rest days, issuance date)
//! - `validation`: Inclusive absence range, observation rules and certificate deadline
//! - `employee`, `motive`, `archive`: Collaborator-facing types
//! - `pipeline`: End-to-end processing of one certificate photo
//!
//! ## Usage
//!
//! ```rust,ignore
//! use certificate_intake::{CertificateProcessor, CertificateRequest, Config};
//!
//! let processor = CertificateProcessor::new(Config::load()?);
//! let outcome = processor.process(request).await;
//! println!("{}", outcome.validation.observations_text());
//! ```

pub mod archive;
pub mod config;
pub mod employee;
pub mod extract;
pub mod imaging;
pub mod motive;
pub mod ocr;
pub mod pipeline;
pub mod validation;

pub use archive::{archive_filename, ArchivalStore, ArchiveError};
pub use config::{Config, ConfigError};
pub use employee::{Employee, EmployeeDirectory};
pub use extract::ExtractionResult;
pub use imaging::{QualityReport, RawImage};
pub use motive::AbsenceMotive;
pub use ocr::{OcrPreference, OcrService, PositionedToken, ProviderError, ProviderKind};
pub use pipeline::{CertificateOutcome, CertificateProcessor, CertificateRequest};
pub use validation::ValidationOutcome;
