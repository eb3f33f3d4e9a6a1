//! Issuance date extraction
//!
//! A certificate usually carries several dates (birth date, consultation,
//! signature). The signature date sits lowest on the page, so positioned
//! tokens are ranked by their lower edge. Without positions the last date
//! in reading order is used instead.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::ocr::PositionedToken;

/// Token starting with D/M/Y (separators `/`, `-` or `.`)
static TOKEN_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})").ok());

/// D/M/Y anywhere in running text
static TEXT_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})").ok());

/// Pick the issuance date, preferring token positions over text order
///
/// Only the winning candidate is parsed; an impossible calendar date there
/// yields `None` rather than falling back to another candidate.
pub fn extract_issuance_date(text: &str, tokens: &[PositionedToken]) -> Option<NaiveDate> {
    let winner = lowest_token_date(tokens).or_else(|| last_text_date(text))?;
    let (day, month, year) = winner;
    let date = NaiveDate::from_ymd_opt(expand_year(year)?, month.parse().ok()?, day.parse().ok()?);
    if date.is_none() {
        tracing::debug!(day = %day, month = %month, year = %year, "Discarding impossible date");
    }
    date
}

/// Two-digit years belong to this century ("24" -> 2024)
pub fn expand_year(year: &str) -> Option<i32> {
    match year.len() {
        2 => format!("20{}", year).parse().ok(),
        4 => year.parse().ok(),
        _ => None,
    }
}

type DateParts<'a> = (&'a str, &'a str, &'a str);

/// Candidate whose box reaches furthest down the page; ties keep token order
fn lowest_token_date(tokens: &[PositionedToken]) -> Option<DateParts<'_>> {
    let re = TOKEN_DATE.as_ref()?;
    tokens
        .iter()
        .filter_map(|token| {
            let text = token.text.trim();
            let captures = re.captures(text)?;
            Some((token.bottom(), split_parts(&captures)?))
        })
        // max_by_key keeps the last maximum; reversed, that is the first token
        .rev()
        .max_by_key(|(bottom, _)| *bottom)
        .map(|(_, parts)| parts)
}

/// Last date by character offset
fn last_text_date(text: &str) -> Option<DateParts<'_>> {
    let re = TEXT_DATE.as_ref()?;
    re.captures_iter(text)
        .last()
        .and_then(|captures| split_parts(&captures))
}

fn split_parts<'a>(captures: &regex::Captures<'a>) -> Option<DateParts<'a>> {
    let part = |i: usize| captures.get(i).map(|m| m.as_str());
    Some((part(1)?, part(2)?, part(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_lowest_token_wins() {
        let tokens = vec![
            PositionedToken::new("01/02/1985", 100, 300, 120, 20),
            PositionedToken::new("12/03/2024", 900, 2100, 130, 30),
            PositionedToken::new("10/03/2024", 100, 600, 120, 20),
        ];
        // Text order would pick 10/03 last; position picks the bottom date
        let text = "Nacimiento 01/02/1985 ... 12/03/2024 ... 10/03/2024";
        assert_eq!(extract_issuance_date(text, &tokens), date(2024, 3, 12));
    }

    #[test]
    fn test_tie_keeps_first_token() {
        let tokens = vec![
            PositionedToken::new("11-03-2024", 100, 1000, 120, 20),
            PositionedToken::new("12-03-2024", 600, 990, 120, 30),
        ];
        assert_eq!(extract_issuance_date("", &tokens), date(2024, 3, 11));
    }

    #[test]
    fn test_token_with_trailing_punctuation() {
        let tokens = vec![PositionedToken::new("05.04.24,", 0, 50, 80, 20)];
        assert_eq!(extract_issuance_date("", &tokens), date(2024, 4, 5));
    }

    #[test]
    fn test_text_fallback_uses_last_occurrence() {
        let tokens = vec![PositionedToken::new("Firma", 0, 2000, 80, 20)];
        let text = "Fecha de nacimiento 3/7/90\nEmitido el 15/03/2024";
        assert_eq!(extract_issuance_date(text, &tokens), date(2024, 3, 15));
    }

    #[test]
    fn test_two_digit_year_expansion() {
        for yy in ["00", "07", "24", "99"] {
            let expected: i32 = format!("20{}", yy).parse().unwrap();
            assert_eq!(expand_year(yy), Some(expected));
        }
        assert_eq!(expand_year("2024"), Some(2024));
        assert_eq!(expand_year("202"), None);
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert_eq!(extract_issuance_date("Fecha 31/04/2024", &[]), None);
        assert_eq!(extract_issuance_date("Fecha 29/02/2023", &[]), None);
        assert_eq!(extract_issuance_date("Fecha 29/02/2024", &[]), date(2024, 2, 29));
    }

    #[test]
    fn test_invalid_winner_does_not_fall_back() {
        let tokens = vec![
            PositionedToken::new("10/03/2024", 0, 100, 100, 20),
            PositionedToken::new("31/09/2024", 0, 900, 100, 20),
        ];
        assert_eq!(extract_issuance_date("", &tokens), None);
    }

    #[test]
    fn test_no_dates() {
        assert_eq!(extract_issuance_date("Reposo 3 dias", &[]), None);
    }
}
