//! Error types for the edgequake-ocr library.
//!
//! Two error types reflect two layers:
//!
//! * [`OcrError`] — every failure the pipeline can surface to a caller. Any
//!   of them aborts the whole request: there is no partial transcript and
//!   no retry. The HTTP layer is the only place that turns one into a
//!   transport-level response.
//!
//! * [`EngineError`] — what a [`crate::pipeline::recognize::RecognitionEngine`]
//!   reports. The recognition adapter wraps it into
//!   [`OcrError::RecognitionError`] together with the page number, so engine
//!   implementations never need to know where a page came from.

use thiserror::Error;

/// All errors returned by the edgequake-ocr pipeline.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried none of the accepted input channels.
    #[error("No image provided")]
    MissingInput,

    /// Base64 payload or raster bytes could not be decoded.
    #[error("Could not decode input: {detail}")]
    DecodeError { detail: String },

    /// The input was present but not acceptable (e.g. a non-HTTP URL scheme).
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// URL fetch failed or returned a non-2xx status.
    #[error("Failed to download '{url}': {reason}")]
    FetchError { url: String, reason: String },

    /// URL fetch exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    FetchTimeout { url: String, secs: u64 },

    // ── Recognition errors ────────────────────────────────────────────────
    /// The recognition engine failed on a page (1-indexed).
    #[error("Recognition failed on page {page}: {detail}")]
    RecognitionError { page: usize, detail: String },

    /// No engine could be built for the requested language.
    #[error("Could not initialise recognition engine for language '{language}': {detail}")]
    EngineInit { language: String, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library for PDF rasterisation.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Short taxonomy name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::MissingInput => "MissingInput",
            OcrError::DecodeError { .. } => "DecodeError",
            OcrError::InvalidInput { .. } => "InvalidInput",
            OcrError::FetchError { .. } | OcrError::FetchTimeout { .. } => "FetchError",
            OcrError::RecognitionError { .. } => "RecognitionError",
            OcrError::EngineInit { .. } => "EngineInit",
            OcrError::PdfiumBindingFailed(_) => "PdfiumBindingFailed",
            OcrError::InvalidConfig(_) => "InvalidConfig",
            OcrError::Internal(_) => "Internal",
        }
    }

    /// Whether the caller is at fault (malformed or missing input).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OcrError::MissingInput | OcrError::DecodeError { .. } | OcrError::InvalidInput { .. }
        )
    }

    pub(crate) fn decode(detail: impl Into<String>) -> Self {
        OcrError::DecodeError {
            detail: detail.into(),
        }
    }
}

/// A failure reported by a recognition engine for a single raster.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}
