//! Archival naming and storage seam
//!
//! The archival store itself (cloud drive, bucket, disk) lives outside this
//! crate. This module names the archived copy and defines the interface.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::employee::Employee;
use crate::validation::format_compact;

/// Archive errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archival copy is empty")]
    EmptyPayload,

    #[error("Archive destination rejected: {0}")]
    Destination(String),

    #[error("Archive backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Stores archival copies and hands back a retrievable link
#[async_trait]
pub trait ArchivalStore: Send + Sync {
    async fn store(
        &self,
        bytes: &[u8],
        filename: &str,
        destination: &str,
    ) -> Result<String, ArchiveError>;
}

/// `DDMMYYYY-<code><Surname>.jpg`, "sinlegajo" standing in for a missing code
pub fn archive_filename(date: NaiveDate, employee: &Employee) -> String {
    let code = employee.employee_code.trim();
    let code = if code.is_empty() { "sinlegajo" } else { code };
    format!(
        "{}-{}{}.jpg",
        format_compact(date),
        code,
        ascii_surname(&employee.surname)
    )
}

/// NFKD fold to ASCII, keeping letters and digits only
fn ascii_surname(surname: &str) -> String {
    surname
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::employee;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_filename_with_code() {
        let emp = employee("30111222", "A15", "Peña Núñez");
        assert_eq!(archive_filename(date(), &emp), "05032024-A15PenaNunez.jpg");
    }

    #[test]
    fn test_filename_without_code() {
        let emp = employee("30111222", "  ", "D'Alessandro-Ruiz");
        assert_eq!(
            archive_filename(date(), &emp),
            "05032024-sinlegajoDAlessandroRuiz.jpg"
        );
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = mock::MemoryStore::default();
        let link = store.store(b"jpeg", "a.jpg", "certs").await.unwrap();
        assert_eq!(link, "memory://certs/a.jpg");
        assert!(matches!(
            store.store(b"", "a.jpg", "certs").await,
            Err(ArchiveError::EmptyPayload)
        ));
    }
}
