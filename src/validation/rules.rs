//! Observation rules
//!
//! Each rule looks at the same facts independently and either fires an
//! observation or stays silent. None of them is fatal.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::dates::format_display;
use crate::config::RulesConfig;
use crate::extract::ExtractionResult;
use crate::imaging::QualityReport;
use crate::motive::AbsenceMotive;

/// Joins observations in the record
pub const OBSERVATION_SEPARATOR: &str = " | ";

/// Everything the rules may look at for one certificate
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub extraction: &'a ExtractionResult,
    pub motive: AbsenceMotive,
    /// Identity number on file for the employee filing the notice
    pub employee_identity: &'a str,
    pub notice_at: NaiveDateTime,
    /// When the certificate photo arrived
    pub received_at: NaiveDateTime,
    pub quality: Option<&'a QualityReport>,
    pub rules: &'a RulesConfig,
}

/// Advisory flag written to the record for a human reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Observation {
    IdentityMismatch,
    LateDelivery,
    LateNotice,
    LowQuality(Vec<String>),
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityMismatch => f.write_str(
                "El DNI del certificado NO COINCIDE con el DNI de la persona que da aviso de su Ausencia.",
            ),
            Self::LateDelivery => f.write_str("El certificado fue subido pasado las 24 hs."),
            Self::LateNotice => f.write_str(
                "El aviso de Ausencia se registró después de las 10:00 hs del día en curso.",
            ),
            Self::LowQuality(reasons) => write!(f, "Calidad de imagen: {}", reasons.join(" ")),
        }
    }
}

type Rule = fn(&ValidationInput<'_>) -> Option<Observation>;

/// Rules in record order
const RULES: [Rule; 4] = [identity_mismatch, late_delivery, late_notice, low_quality];

/// Run every rule, keeping the ones that fire in table order
pub fn evaluate(input: &ValidationInput<'_>) -> Vec<Observation> {
    RULES.iter().filter_map(|rule| rule(input)).collect()
}

fn identity_mismatch(input: &ValidationInput<'_>) -> Option<Observation> {
    identity_differs(input).then_some(Observation::IdentityMismatch)
}

fn late_delivery(input: &ValidationInput<'_>) -> Option<Observation> {
    delivered_late(input).then_some(Observation::LateDelivery)
}

fn late_notice(input: &ValidationInput<'_>) -> Option<Observation> {
    (input.notice_at.time() > input.rules.late_notice_cutoff).then_some(Observation::LateNotice)
}

fn low_quality(input: &ValidationInput<'_>) -> Option<Observation> {
    let report = input.quality?;
    (!report.reasons.is_empty()).then(|| Observation::LowQuality(report.reasons.clone()))
}

/// A number was read and it is not the employee's; a missing number is not a mismatch
fn identity_differs(input: &ValidationInput<'_>) -> bool {
    input.motive.requires_certificate()
        && input
            .extraction
            .identity_number
            .as_deref()
            .is_some_and(|read| read != input.employee_identity)
}

fn delivered_late(input: &ValidationInput<'_>) -> bool {
    let Some(issued) = input.extraction.issuance_date else {
        return false;
    };
    issued != input.notice_at.date()
        && input.received_at - input.notice_at > input.rules.delivery_window()
}

/// Message for the employee after a certificate is processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UserNotice {
    IdentityNotDetected,
    IdentityMismatch { certificate: String, employee: String },
    DateNotDetected,
    LateDelivery { issued: String, notice: String },
    RestDaysNotDetected,
}

impl fmt::Display for UserNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityNotDetected => f.write_str("No se detectó DNI en el certificado."),
            Self::IdentityMismatch {
                certificate,
                employee,
            } => write!(
                f,
                "El DNI del certificado ({}) no coincide con el del empleado ({}).",
                certificate, employee
            ),
            Self::DateNotDetected => f.write_str("No se detectó fecha en el certificado."),
            Self::LateDelivery { issued, notice } => write!(
                f,
                "El certificado fue entregado fuera de plazo (>24hs): {} vs aviso {}.",
                issued, notice
            ),
            Self::RestDaysNotDetected => {
                f.write_str("No se detectaron días de reposo en el certificado.")
            }
        }
    }
}

/// Notices shown to the employee; only certificate motives get any
pub fn user_notices(input: &ValidationInput<'_>) -> Vec<UserNotice> {
    if !input.motive.requires_certificate() {
        return Vec::new();
    }

    let extraction = input.extraction;
    let mut notices = Vec::new();

    match extraction.identity_number.as_deref() {
        None => notices.push(UserNotice::IdentityNotDetected),
        Some(read) if identity_differs(input) => notices.push(UserNotice::IdentityMismatch {
            certificate: read.to_string(),
            employee: input.employee_identity.to_string(),
        }),
        Some(_) => {}
    }

    match extraction.issuance_date {
        None => notices.push(UserNotice::DateNotDetected),
        Some(issued) if delivered_late(input) => notices.push(UserNotice::LateDelivery {
            issued: format_display(issued),
            notice: format_display(input.notice_at.date()),
        }),
        Some(_) => {}
    }

    if extraction.rest_days.is_none() {
        notices.push(UserNotice::RestDaysNotDetected);
    }

    notices
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn extraction(identity: Option<&str>, issued_day: Option<u32>) -> ExtractionResult {
        ExtractionResult {
            identity_number: identity.map(str::to_string),
            rest_days: Some(3),
            issuance_date: issued_day.and_then(|d| NaiveDate::from_ymd_opt(2024, 3, d)),
            provider: None,
        }
    }

    fn input<'a>(
        extraction: &'a ExtractionResult,
        rules: &'a RulesConfig,
        notice_at: NaiveDateTime,
        received_at: NaiveDateTime,
    ) -> ValidationInput<'a> {
        ValidationInput {
            extraction,
            motive: AbsenceMotive::Illness,
            employee_identity: "30111222",
            notice_at,
            received_at,
            quality: None,
            rules,
        }
    }

    #[test]
    fn test_clean_certificate() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("30111222"), Some(12));
        let input = input(&ext, &rules, at(12, 9, 30), at(12, 9, 45));
        assert!(evaluate(&input).is_empty());
        assert!(user_notices(&input).is_empty());
    }

    #[test]
    fn test_identity_mismatch() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("12345678"), Some(12));
        let input = ValidationInput {
            employee_identity: "87654321",
            ..input(&ext, &rules, at(12, 9, 0), at(12, 9, 5))
        };
        assert_eq!(evaluate(&input), vec![Observation::IdentityMismatch]);
        assert_eq!(
            user_notices(&input)[0].to_string(),
            "El DNI del certificado (12345678) no coincide con el del empleado (87654321)."
        );
    }

    #[test]
    fn test_missing_identity_is_notice_only() {
        let rules = RulesConfig::default();
        let ext = extraction(None, Some(12));
        let input = input(&ext, &rules, at(12, 9, 0), at(12, 9, 5));
        assert!(evaluate(&input).is_empty());
        assert_eq!(user_notices(&input), vec![UserNotice::IdentityNotDetected]);
    }

    #[test]
    fn test_identity_ignored_without_certificate_motive() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("12345678"), None);
        let input = ValidationInput {
            motive: AbsenceMotive::Accident,
            ..input(&ext, &rules, at(12, 9, 0), at(12, 9, 5))
        };
        assert!(evaluate(&input).is_empty());
        assert!(user_notices(&input).is_empty());
    }

    #[test]
    fn test_late_delivery() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("30111222"), Some(13));
        let late = input(&ext, &rules, at(12, 8, 0), at(13, 8, 1));
        assert_eq!(evaluate(&late), vec![Observation::LateDelivery]);
        assert_eq!(
            user_notices(&late)[0].to_string(),
            "El certificado fue entregado fuera de plazo (>24hs): 13/03/2024 vs aviso 12/03/2024."
        );

        // Exactly the window is still on time
        let on_time = input(&ext, &rules, at(12, 8, 0), at(13, 8, 0));
        assert!(evaluate(&on_time).is_empty());
    }

    #[test]
    fn test_out_of_range_window_uses_default() {
        let rules = RulesConfig {
            delivery_window_hours: 9_999_999_999_999,
            ..RulesConfig::default()
        };
        let ext = extraction(Some("30111222"), Some(13));
        let late = input(&ext, &rules, at(12, 8, 0), at(13, 8, 1));
        assert_eq!(evaluate(&late), vec![Observation::LateDelivery]);
    }

    #[test]
    fn test_same_day_certificate_is_never_late() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("30111222"), Some(12));
        let input = input(&ext, &rules, at(12, 8, 0), at(15, 8, 0));
        assert!(evaluate(&input).is_empty());
    }

    #[test]
    fn test_late_notice_cutoff() {
        let rules = RulesConfig::default();
        let ext = ExtractionResult::default();

        let flagged = input(&ext, &rules, at(12, 11, 15), at(12, 11, 20));
        assert_eq!(evaluate(&flagged), vec![Observation::LateNotice]);

        let boundary = input(&ext, &rules, at(12, 10, 0), at(12, 10, 5));
        assert!(evaluate(&boundary).is_empty());
    }

    #[test]
    fn test_quality_reasons_are_informational() {
        let rules = RulesConfig::default();
        let ext = extraction(Some("99999999"), Some(12));
        let report = crate::imaging::assess_bytes(b"garbage");
        let mut blurry = report.clone();
        blurry.is_acceptable = false;
        blurry.reasons = vec!["Posible desenfoque (baja nitidez).".to_string()];

        let input = ValidationInput {
            quality: Some(&blurry),
            ..input(&ext, &rules, at(12, 10, 30), at(12, 10, 35))
        };
        let observations: Vec<String> = evaluate(&input).iter().map(|o| o.to_string()).collect();
        assert_eq!(
            observations,
            vec![
                Observation::IdentityMismatch.to_string(),
                Observation::LateNotice.to_string(),
                "Calidad de imagen: Posible desenfoque (baja nitidez).".to_string(),
            ]
        );
    }
}
