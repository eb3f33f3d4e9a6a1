//! Rest-day count extraction
//!
//! Certificates state the prescription as "Reposo 3 días" or spell the
//! number out ("Reposo de cinco días"). Some layouts put it under an
//! "Rp:" / "Observaciones:" heading instead.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Patterns in priority order; the last group is the count
static REST_DAY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)reposo\D{0,20}?(\d{1,2}|\w+)\s*d[ií]as?",
        r"(?is)(?:Rp|Observaciones)[:\s].*?reposo\D{0,20}?(\d{1,2}|\w+)\s*d[ií]as?",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Spanish cardinals, keyed without accents
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("un", 1),
    ("uno", 1),
    ("una", 1),
    ("dos", 2),
    ("tres", 3),
    ("cuatro", 4),
    ("cinco", 5),
    ("seis", 6),
    ("siete", 7),
    ("ocho", 8),
    ("nueve", 9),
    ("diez", 10),
    ("once", 11),
    ("doce", 12),
    ("trece", 13),
    ("catorce", 14),
    ("quince", 15),
    ("dieciseis", 16),
    ("diecisiete", 17),
    ("dieciocho", 18),
    ("diecinueve", 19),
    ("veinte", 20),
];

/// Find the prescribed number of rest days
pub fn extract_rest_days(text: &str) -> Option<u32> {
    REST_DAY_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let token = captures.get(captures.len() - 1)?.as_str();
        let days = number_from_token(token);
        if days.is_none() {
            tracing::debug!(token = %token, "Unrecognised rest-day count");
        }
        days
    })
}

/// Digits or a Spanish number word; zero and unknown words yield `None`
pub fn number_from_token(token: &str) -> Option<u32> {
    let token = token.trim();
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok().filter(|days| *days > 0);
    }
    let folded = fold_accents(&token.to_lowercase());
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == folded)
        .map(|(_, value)| *value)
}

/// "dieciséis" -> "dieciseis"
fn fold_accents(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelled_out_count() {
        assert_eq!(extract_rest_days("Reposo de cinco días"), Some(5));
        assert_eq!(extract_rest_days("Se indica reposo por DOS dias"), Some(2));
        assert_eq!(extract_rest_days("Reposo: un día"), Some(1));
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(extract_rest_days("Reposo 3 dias"), Some(3));
        assert_eq!(extract_rest_days("REPOSO: 10 DÍAS"), Some(10));
        assert_eq!(extract_rest_days("Reposo 7dias laborales"), Some(7));
    }

    #[test]
    fn test_accented_variants() {
        assert_eq!(extract_rest_days("Reposo de dieciséis días"), Some(16));
        assert_eq!(extract_rest_days("Reposo de dieciseis dias"), Some(16));
    }

    #[test]
    fn test_unrecognized_word() {
        assert_eq!(extract_rest_days("Reposo de muchos días"), None);
        assert_eq!(extract_rest_days("Reposo absoluto"), None);
    }

    #[test]
    fn test_zero_is_not_a_count() {
        assert_eq!(extract_rest_days("Reposo 0 dias"), None);
    }

    #[test]
    fn test_observaciones_layout() {
        let text = "Observaciones:\nindicar reposo de cuatro días";
        assert_eq!(extract_rest_days(text), Some(4));
    }

    #[test]
    fn test_falls_through_to_labeled_pattern() {
        // The first "Reposo" carries an unknown word, the labeled one does not
        let text = "Reposo de muchos días.\nObservaciones: reposo de cuatro días";
        assert_eq!(extract_rest_days(text), Some(4));
    }

    #[test]
    fn test_rp_label() {
        assert_eq!(extract_rest_days("Rp: indicar reposo de dos días"), Some(2));
    }

    #[test]
    fn test_labeled_count_across_lines() {
        // Only the labeled pattern reaches the count split over several lines
        let text = "Reposo de muchos días\nRp:\nreposo\nde tres\ndías";
        assert_eq!(extract_rest_days(text), Some(3));
    }

    #[test]
    fn test_number_from_token() {
        assert_eq!(number_from_token("12"), Some(12));
        assert_eq!(number_from_token("Veinte"), Some(20));
        assert_eq!(number_from_token("veintiuno"), None);
        assert_eq!(number_from_token(""), None);
    }
}
