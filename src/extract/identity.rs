//! Identity number extraction

use std::sync::LazyLock;

use regex::Regex;

/// Patterns in priority order; group 1 is the number
static IDENTITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Explicit "DNI: 30.111.222" / "DNI 30111222"
        r"(?i)\bDNI[:\s]*(\d{1,2}\.?\d{3}\.?\d{3})\b",
        // Explicit "Documento: ..."
        r"(?i)\bDocumento[:\s]*(\d{1,2}\.?\d{3}\.?\d{3})\b",
        // Any bare 8-digit token
        r"\b(\d{8})\b",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Find the identity number, first matching pattern wins
pub fn extract_identity_number(text: &str) -> Option<String> {
    IDENTITY_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let digits: String = captures
            .get(1)?
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        (7..=8).contains(&digits.len()).then_some(digits)
    })
}
