//! Configuration management for certificate intake

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;
use thiserror::Error;

use crate::ocr::OcrPreference;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub image: ImageConfig,
    pub ocr: OcrConfig,
    pub rules: RulesConfig,
}

/// Image normalisation knobs
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// Longest side of the archival copy
    pub archive_max_side: u32,
    /// JPEG quality of the archival copy
    pub archive_quality: u8,
    /// Longest side the recognition copy is upscaled to
    pub recognition_target_side: u32,
    /// Contrast multiplier applied after auto-contrast
    pub contrast_factor: f32,
    /// Median filter window (odd, pixels)
    pub median_window: u32,
    /// Luminance above which a pixel becomes white
    pub binarize_threshold: u8,
    /// JPEG quality of the colour copy sent to the cloud provider
    pub cloud_quality: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub preference: OcrPreference,
    pub vision_api_key: Option<String>,
    pub vision_endpoint: String,
    pub tesseract_cmd: String,
    pub language: String,
    /// Bound on a single provider call
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Notices filed after this local time are flagged
    pub late_notice_cutoff: NaiveTime,
    /// Window for delivering the certificate after the notice
    pub delivery_window_hours: i64,
    /// Lead time of the delivery reminder
    pub reminder_before_hours: i64,
}

/// Longest delivery window or reminder lead accepted, in hours (one leap year)
pub const MAX_WINDOW_HOURS: i64 = 366 * 24;

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RulesConfig {
    /// Delivery window; out-of-range values fall back to 24 h
    pub fn delivery_window(&self) -> chrono::Duration {
        bounded_hours(self.delivery_window_hours, 24)
    }

    /// Reminder lead before the deadline; out-of-range values fall back to 2 h
    pub fn reminder_lead(&self) -> chrono::Duration {
        bounded_hours(self.reminder_before_hours, 2)
    }
}

fn bounded_hours(hours: i64, fallback: i64) -> chrono::Duration {
    (0..=MAX_WINDOW_HOURS)
        .contains(&hours)
        .then(|| chrono::Duration::try_hours(hours))
        .flatten()
        .unwrap_or_else(|| {
            tracing::warn!(hours, fallback, "Window out of range, using default");
            chrono::Duration::try_hours(fallback).unwrap_or_else(chrono::Duration::zero)
        })
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            archive_max_side: 1200,
            archive_quality: 70,
            recognition_target_side: 1800,
            contrast_factor: 1.7,
            median_window: 3,
            binarize_threshold: 150,
            cloud_quality: 90,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            preference: OcrPreference::Auto,
            vision_api_key: None,
            vision_endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            language: "spa".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            late_notice_cutoff: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            delivery_window_hours: 24,
            reminder_before_hours: 2,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            image: ImageConfig::default(),
            ocr: OcrConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let image = ImageConfig::default();
        let ocr = OcrConfig::default();
        let rules = RulesConfig::default();

        let preference = match env::var("OCR_PROVIDER") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "OCR_PROVIDER",
                value,
            })?,
            Err(_) => ocr.preference,
        };

        let late_notice_cutoff = match env::var("LATE_NOTICE_CUTOFF") {
            Ok(value) => NaiveTime::parse_from_str(&value, "%H:%M")
                .map_err(|_| ConfigError::InvalidValue {
                    key: "LATE_NOTICE_CUTOFF",
                    value,
                })?,
            Err(_) => rules.late_notice_cutoff,
        };

        let delivery_window_hours =
            hours_env("CERT_DEADLINE_HOURS", rules.delivery_window_hours)?;
        let reminder_before_hours =
            hours_env("CERT_REMINDER_BEFORE_HOURS", rules.reminder_before_hours)?;

        Ok(Config {
            image: ImageConfig {
                archive_max_side: env_or("MAX_IMG_SIZE", image.archive_max_side),
                archive_quality: env_or("IMG_QUALITY", image.archive_quality),
                recognition_target_side: env_or("OCR_TARGET_SIDE", image.recognition_target_side),
                ..image
            },
            ocr: OcrConfig {
                preference,
                vision_api_key: env::var("GOOGLE_VISION_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                vision_endpoint: env::var("GOOGLE_VISION_ENDPOINT").unwrap_or(ocr.vision_endpoint),
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(ocr.tesseract_cmd),
                language: env::var("OCR_LANGUAGE").unwrap_or(ocr.language),
                timeout_secs: env_or("OCR_TIMEOUT_SECS", ocr.timeout_secs),
            },
            rules: RulesConfig {
                late_notice_cutoff,
                delivery_window_hours,
                reminder_before_hours,
            },
        })
    }
}

/// Parse an env var, keeping the default when absent or malformed
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Hour counts must stay within `0..=MAX_WINDOW_HOURS`
fn hours_env(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    let hours = env_or(key, default);
    if (0..=MAX_WINDOW_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: hours.to_string(),
        })
    }
}
