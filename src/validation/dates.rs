//! Date arithmetic and record formats

use chrono::{Days, NaiveDate};

/// Inclusive absence range: a certificate for N days issued on D covers D..=D+(N-1)
pub fn absence_range(
    issuance_date: Option<NaiveDate>,
    rest_days: Option<u32>,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = issuance_date?;
    let days = rest_days.filter(|days| *days > 0)?;
    let end = start.checked_add_days(Days::new(u64::from(days) - 1))?;
    Some((start, end))
}

/// `DDMMYYYY`, the compact form used in records and filenames
pub fn format_compact(date: NaiveDate) -> String {
    date.format("%d%m%Y").to_string()
}

/// `DD/MM/YYYY` for messages
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn parse_compact(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d%m%Y").ok()
}
