//! Tesseract provider
//!
//! Runs the `tesseract` CLI once per image, asking for both the plain text
//! and the TSV word table so positions come from the same recognition pass.
//!
//! ## Requirements
//!
//! - `tesseract` must be installed (or `TESSERACT_CMD` must point to it)
//! - The language pack in use (default `spa`) must be installed

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use super::provider::TextExtractionProvider;
use super::types::{ImageVariant, PositionedToken, ProviderError, ProviderKind, RecognizedText};

/// Local Tesseract OCR provider
pub struct TesseractProvider {
    command: String,
    language: String,
    /// Temporary directory for processing (default: system temp)
    temp_dir: Option<PathBuf>,
}

impl TesseractProvider {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
            temp_dir: None,
        }
    }

    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = Some(dir);
        self
    }

    /// Per-call scratch directory under the configured (or system) temp dir
    fn scratch_dir(&self) -> Result<TempDir, ProviderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ocr_");
        match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(|e| ProviderError::Processing(format!("Failed to create temp dir: {}", e)))
    }

    /// Validate language code to prevent argument injection
    fn validate_language(lang: &str) -> Result<(), ProviderError> {
        if lang.is_empty() || lang.len() > 20 {
            return Err(ProviderError::InvalidLanguage(lang.to_string()));
        }
        if !lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_')
        {
            return Err(ProviderError::InvalidLanguage(lang.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TextExtractionProvider for TesseractProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tesseract
    }

    fn variant(&self) -> ImageVariant {
        ImageVariant::Recognition
    }

    async fn extract(&self, image_data: &[u8]) -> Result<RecognizedText, ProviderError> {
        Self::validate_language(&self.language)?;

        // Owned by this future: dropped (and deleted) on timeout as well
        let work_dir = self.scratch_dir()?;
        let input_path = work_dir.path().join("input.png");
        let output_base = work_dir.path().join("output");
        let text_path = output_base.with_extension("txt");
        let tsv_path = output_base.with_extension("tsv");

        tokio::fs::write(&input_path, image_data)
            .await
            .map_err(|e| ProviderError::Processing(format!("Failed to write temp file: {}", e)))?;

        // LSTM engine, single uniform block of text
        let output = Command::new(&self.command)
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("6")
            .arg("txt")
            .arg("tsv")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProviderError::NotAvailable(format!("Failed to run {}: {}", self.command, e))
            })?;

        let full_text = tokio::fs::read_to_string(&text_path).await;
        let tsv = tokio::fs::read_to_string(&tsv_path).await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Processing(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let full_text = full_text
            .map_err(|e| ProviderError::Processing(format!("Failed to read output: {}", e)))?;

        // Positions are optional; text alone is still usable
        let tokens = match tsv {
            Ok(tsv) => parse_tsv(&tsv),
            Err(e) => {
                tracing::warn!(error = %e, "Tesseract TSV output missing, continuing without positions");
                Vec::new()
            }
        };

        Ok(RecognizedText { full_text, tokens })
    }
}

/// Parse Tesseract TSV output into word tokens
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text
pub(crate) fn parse_tsv(tsv: &str) -> Vec<PositionedToken> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 12 {
                return None;
            }
            let text = parts[11].trim();
            if text.is_empty() {
                return None;
            }
            Some(PositionedToken::new(
                text,
                parts[6].parse().ok()?,
                parts[7].parse().ok()?,
                parts[8].parse().ok()?,
                parts[9].parse().ok()?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t1800\t2400\t-1\t
5\t1\t1\t1\t1\t1\t120\t88\t64\t30\t96.1\tDNI:
5\t1\t1\t1\t1\t2\t200\t88\t150\t30\t91.3\t30111222
5\t1\t3\t1\t1\t1\t1300\t2100\t210\t34\t88.0\t12/03/2024
";

    #[test]
    fn test_parse_tsv_skips_structural_rows() {
        let tokens = parse_tsv(SAMPLE_TSV);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "DNI:");
        assert_eq!(tokens[1], PositionedToken::new("30111222", 200, 88, 150, 30));
        assert_eq!(tokens[2].bottom(), 2134);
    }

    #[test]
    fn test_parse_tsv_ignores_malformed_lines() {
        let tokens = parse_tsv("header\n5\t1\t1\nnot\ta\tvalid\trow\t\t\tx\ty\tz\tw\t0\tword\n");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_validate_language() {
        assert!(TesseractProvider::validate_language("spa").is_ok());
        assert!(TesseractProvider::validate_language("spa+eng").is_ok());
        assert!(TesseractProvider::validate_language("").is_err());
        assert!(TesseractProvider::validate_language("spa --psm 0").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TesseractProvider::new("/nonexistent/tesseract-binary", "spa")
            .with_temp_dir(dir.path().to_path_buf());

        let result = provider.extract(b"not really a png").await;
        assert!(matches!(result, Err(ProviderError::NotAvailable(_))));

        // Input file is cleaned up even when the command cannot start
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_engine_leaves_no_files() {
        use std::os::unix::fs::PermissionsExt;
        use std::sync::Arc;
        use std::time::Duration;

        use crate::imaging::PreparedImages;
        use crate::ocr::OcrService;

        let bin = tempfile::tempdir().unwrap();
        let engine = bin.path().join("hung-tesseract");
        std::fs::write(&engine, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

        let work = tempfile::tempdir().unwrap();
        let provider = TesseractProvider::new(engine.to_str().unwrap(), "spa")
            .with_temp_dir(work.path().to_path_buf());
        let service = OcrService::with_providers(vec![Arc::new(provider) as Arc<dyn TextExtractionProvider>])
            .with_timeout(Duration::from_millis(300));
        let images = PreparedImages::passthrough(b"not really a png");

        for _ in 0..3 {
            let result = service.extract(&images).await;
            assert!(!result.has_any_field());
        }

        let left: Vec<_> = std::fs::read_dir(work.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert!(left.is_empty(), "files left behind: {:?}", left);
    }
}
