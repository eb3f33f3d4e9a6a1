//! Validation
//!
//! Turns extracted certificate fields into the absence record: the
//! inclusive date range, reviewer observations and employee notices.

mod dates;
mod deadline;
mod rules;

pub use dates::{absence_range, format_compact, format_display, parse_compact};
pub use deadline::CertificateDeadline;
pub use rules::{evaluate, user_notices, Observation, UserNotice, ValidationInput, OBSERVATION_SEPARATOR};

use chrono::NaiveDate;
use serde::Serialize;

/// Result of validating one certificate; written verbatim to the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub absence_start: Option<NaiveDate>,
    pub absence_end: Option<NaiveDate>,
    /// Rest days as read, even when the date could not be
    pub duration_days: Option<u32>,
    pub observations: Vec<String>,
    /// Messages for the employee, kept out of the record
    pub notices: Vec<String>,
}

impl ValidationOutcome {
    pub fn evaluate(input: &ValidationInput<'_>) -> Self {
        let extraction = input.extraction;
        let range = absence_range(extraction.issuance_date, extraction.rest_days);

        let observations: Vec<String> = evaluate(input).iter().map(|o| o.to_string()).collect();
        let notices = user_notices(input).iter().map(|n| n.to_string()).collect();

        if !observations.is_empty() {
            tracing::info!(count = observations.len(), "Certificate flagged for review");
        }

        Self {
            absence_start: range.map(|(start, _)| start),
            absence_end: range.map(|(_, end)| end),
            duration_days: extraction.rest_days,
            observations,
            notices,
        }
    }

    /// Observations joined for the record's single text column
    pub fn observations_text(&self) -> String {
        self.observations.join(OBSERVATION_SEPARATOR)
    }
}
