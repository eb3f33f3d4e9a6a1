//! Field Extractors
//!
//! Independent heuristic parsers over recognised certificate text. Each one
//! walks a declarative pattern table in priority order and returns `None`
//! when nothing matches; none of them can fail.

mod identity;
mod issuance_date;
mod rest_days;

pub use identity::extract_identity_number;
pub use issuance_date::{expand_year, extract_issuance_date};
pub use rest_days::{extract_rest_days, number_from_token};

use chrono::NaiveDate;
use serde::Serialize;

use crate::ocr::{PositionedToken, ProviderKind};

/// Fields recovered from one certificate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// 7-8 digit national identity number
    pub identity_number: Option<String>,
    /// Prescribed rest days, inclusive of the issuance date
    pub rest_days: Option<u32>,
    pub issuance_date: Option<NaiveDate>,
    /// Provider whose text produced these fields
    pub provider: Option<ProviderKind>,
}

impl ExtractionResult {
    /// Run every extractor over already-normalised text
    pub fn from_text(text: &str, tokens: &[PositionedToken]) -> Self {
        Self {
            identity_number: extract_identity_number(text),
            rest_days: extract_rest_days(text),
            issuance_date: extract_issuance_date(text, tokens),
            provider: None,
        }
    }

    /// At least one field was recovered
    pub fn has_any_field(&self) -> bool {
        self.identity_number.is_some() || self.rest_days.is_some() || self.issuance_date.is_some()
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_collects_all_fields() {
        let text = "Certifico que el paciente DNI: 30111222\nrequiere Reposo de cinco días\nBuenos Aires, 12/03/2024";
        let result = ExtractionResult::from_text(text, &[]);

        assert_eq!(result.identity_number.as_deref(), Some("30111222"));
        assert_eq!(result.rest_days, Some(5));
        assert_eq!(result.issuance_date, NaiveDate::from_ymd_opt(2024, 3, 12));
        assert!(result.has_any_field());
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let result = ExtractionResult::from_text("", &[]);
        assert_eq!(result, ExtractionResult::default());
        assert!(!result.has_any_field());
    }
}
