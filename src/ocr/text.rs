//! OCR text fixes
//!
//! Recognisers split short capitalised labels into spaced letters
//! ("D N I", "R e p o s o"). The field extractors expect the joined form.

use std::sync::LazyLock;

use regex::Regex;

/// Confusable sequence -> canonical label
static FIXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)D\s*N\s*I", "DNI"),
        (r"(?i)R\s*e\s*p\s*o\s*s\s*o", "Reposo"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Apply the known OCR fixes to recognised text
pub fn normalize_text(text: &str) -> String {
    FIXES
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}
