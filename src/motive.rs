//! Absence motives

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Reason given for an absence notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbsenceMotive {
    Illness,
    Accident,
    FamilyIllness,
    CourtSummons,
    Bereavement,
    UnionLeave,
}

impl AbsenceMotive {
    pub const ALL: [AbsenceMotive; 6] = [
        Self::Illness,
        Self::Accident,
        Self::FamilyIllness,
        Self::CourtSummons,
        Self::Bereavement,
        Self::UnionLeave,
    ];

    /// Label as shown to employees and written to the record
    pub fn label(&self) -> &'static str {
        match self {
            Self::Illness => "Enfermedad",
            Self::Accident => "Accidente",
            Self::FamilyIllness => "Enfermedad Familiar",
            Self::CourtSummons => "Citación Judicial",
            Self::Bereavement => "Fallecimiento",
            Self::UnionLeave => "Permiso Gremial",
        }
    }

    /// Only illness motives are backed by a medical certificate
    pub fn requires_certificate(&self) -> bool {
        matches!(self, Self::Illness | Self::FamilyIllness)
    }
}

impl fmt::Display for AbsenceMotive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AbsenceMotive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold(s);
        Self::ALL
            .into_iter()
            .find(|motive| fold(motive.label()) == wanted)
            .ok_or_else(|| format!("unknown absence motive: {}", s.trim()))
    }
}

/// Lowercase, accent-free, single-spaced
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
