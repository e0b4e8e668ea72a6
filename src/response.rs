//! Response assembly: package pipeline results into the JSON contracts.
//!
//! No business logic lives here beyond counting, rounding, and reshaping.

use crate::config::{ServiceConfig, SUPPORTED_LANGUAGES};
use crate::error::OcrError;
use crate::output::{round2, Aggregation, Quad, RecognizedLine, StructureStats, StructuredDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corners of a recognised line, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: [f32; 2],
    pub top_right: [f32; 2],
    pub bottom_right: [f32; 2],
    pub bottom_left: [f32; 2],
}

impl From<&Quad> for BoundingBox {
    fn from(q: &Quad) -> Self {
        Self {
            top_left: q.top_left(),
            top_right: q.top_right(),
            bottom_right: q.bottom_right(),
            bottom_left: q.bottom_left(),
        }
    }
}

/// Per-line entry of [`OcrResponse::details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDetail {
    pub text: String,
    /// Percentage, two decimals.
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl From<&RecognizedLine> for LineDetail {
    fn from(line: &RecognizedLine) -> Self {
        Self {
            text: line.text.clone(),
            confidence: round2(line.confidence as f64 * 100.0),
            bbox: BoundingBox::from(&line.quad),
        }
    }
}

/// Body of `POST /ocr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    pub text: String,
    pub language: String,
    pub confidence: f64,
    pub lines_count: usize,
    pub words_count: usize,
    pub details: Vec<LineDetail>,
}

/// Body of `POST /ocr-markdown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownResponse {
    pub success: bool,
    pub markdown: String,
    pub text: String,
    pub source: String,
    pub has_structure: bool,
    pub language: String,
    pub confidence: f64,
    pub lines_count: usize,
    pub words_count: usize,
    pub page_count: usize,
    pub is_pdf: bool,
    pub structure_stats: StructureStats,
}

/// Body of `GET /languages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub default: String,
    pub supported: BTreeMap<String, String>,
}

/// Failure envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

const USAGE_HINT: &str =
    "Send an image via 'image' (multipart), as base64 in JSON ('image'), or as a URL in JSON ('url')";

/// Build the plain-transcript response.
pub fn assemble_text(aggregation: &Aggregation, language: &str) -> OcrResponse {
    OcrResponse {
        success: true,
        text: aggregation.transcript.text(),
        language: language.to_string(),
        confidence: aggregation.confidence,
        lines_count: aggregation.line_count,
        words_count: aggregation.word_count(),
        details: aggregation.lines().map(LineDetail::from).collect(),
    }
}

/// Where a document came from and how it was paginated.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub label: String,
    pub page_count: usize,
    pub is_pdf: bool,
}

/// Build the structured (Markdown) response.
pub fn assemble_markdown(
    aggregation: &Aggregation,
    structured: StructuredDocument,
    language: &str,
    source: &SourceInfo,
) -> MarkdownResponse {
    MarkdownResponse {
        success: true,
        markdown: structured.markdown,
        text: aggregation.transcript.text(),
        source: source.label.clone(),
        has_structure: structured.has_structure,
        language: language.to_string(),
        confidence: aggregation.confidence,
        lines_count: aggregation.line_count,
        words_count: aggregation.word_count(),
        page_count: source.page_count,
        is_pdf: source.is_pdf,
        structure_stats: structured.stats,
    }
}

/// Default language plus the supported-language table.
pub fn assemble_languages(config: &ServiceConfig) -> LanguagesResponse {
    LanguagesResponse {
        default: config.default_language.clone(),
        supported: SUPPORTED_LANGUAGES
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect(),
    }
}

/// Failure envelope for `err`.
pub fn assemble_error(err: &OcrError) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: err.to_string(),
        usage: matches!(err, OcrError::MissingInput).then(|| USAGE_HINT.to_string()),
    }
}
