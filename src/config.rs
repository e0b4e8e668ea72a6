//! Configuration types for the OCR service.
//!
//! All pipeline behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. One struct holds every knob so it can be
//! shared read-only across request handlers and logged at startup.

use crate::error::OcrError;
use serde::Serialize;
use std::path::PathBuf;

/// Languages the recognition engine has models for, with display names.
///
/// Codes follow PaddleOCR's naming (`german`, `japan`, …), not ISO 639.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("fr", "Français"),
    ("en", "English"),
    ("ch", "Chinese (Simplified)"),
    ("german", "Deutsch"),
    ("japan", "Japanese"),
    ("korean", "Korean"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
    ("latin", "Latin languages"),
];

/// Configuration for the OCR pipeline and its HTTP surface.
///
/// Built via [`ServiceConfig::builder()`] or using [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_ocr::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .default_language("en")
///     .dpi(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    /// Recognition language used when a request does not name one. Default: `fr`.
    pub default_language: String,

    /// Rasterisation resolution for PDF pages. Range: 72–600. Default: 200.
    ///
    /// Recognition quality drops sharply below ~150 DPI on body text; above
    /// 300 DPI the detector spends most of its time on empty margins.
    pub dpi: u32,

    /// Maximum rasterised page dimension (width or height) in pixels. Default: 4000.
    ///
    /// Applied after the DPI scale, so an oversized page (A0 poster) is
    /// shrunk proportionally instead of allocating a gigapixel bitmap.
    pub max_rendered_pixels: u32,

    /// Timeout for URL inputs, in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Maximum accepted request body size in bytes. Default: 32 MiB.
    pub max_upload_bytes: usize,

    /// Directory containing libpdfium. `None` binds the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Directory containing recognition models. Default: `models`.
    pub model_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_language: "fr".to_string(),
            dpi: 200,
            max_rendered_pixels: 4000,
            download_timeout_secs: 60,
            max_upload_bytes: 32 * 1024 * 1024,
            pdfium_lib_path: None,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn default_language(mut self, lang: impl Into<String>) -> Self {
        self.config.default_language = lang.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_dir = path.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, OcrError> {
        let c = &self.config;
        if language_name(&c.default_language).is_none() {
            return Err(OcrError::InvalidConfig(format!(
                "Default language '{}' is not supported (expected one of: {})",
                c.default_language,
                supported_codes()
            )));
        }
        if c.dpi < 72 || c.dpi > 600 {
            return Err(OcrError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(OcrError::InvalidConfig(
                "Maximum upload size must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Display name for a supported language code, if known.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Accept `code` only if it is in [`SUPPORTED_LANGUAGES`].
///
/// Request languages become engine cache keys and model directory names,
/// so anything outside the table is rejected as a client error.
pub fn check_language(code: &str) -> Result<(), OcrError> {
    match language_name(code) {
        Some(_) => Ok(()),
        None => Err(OcrError::InvalidInput {
            input: format!("lang={code}"),
            reason: format!("unsupported language, expected one of: {}", supported_codes()),
        }),
    }
}

fn supported_codes() -> String {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, _)| *code)
        .collect::<Vec<_>>()
        .join(", ")
}
