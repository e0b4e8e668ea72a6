//! Data model shared by the pipeline stages.
//!
//! Everything here is request-scoped: a [`Document`] is built by the source
//! resolver, consumed by the page aggregator, and dropped once every page has
//! been recognised. Only the recognised text travels further downstream.

use crate::error::OcrError;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Token injected on its own paragraph between the pages of a multi-page source.
pub const PAGE_SEPARATOR: &str = "---";

/// One decoded page, always 8-bit RGB regardless of the source encoding.
#[derive(Debug, Clone)]
pub struct RasterPage {
    image: RgbImage,
}

impl RasterPage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// An ordered, non-empty list of pages plus whether the source was paginated.
#[derive(Debug, Clone)]
pub struct Document {
    pages: Vec<RasterPage>,
    is_multi_page_source: bool,
}

impl Document {
    /// Build a document; fails with `DecodeError` when `pages` is empty.
    pub fn new(pages: Vec<RasterPage>, is_multi_page_source: bool) -> Result<Self, OcrError> {
        if pages.is_empty() {
            return Err(OcrError::decode("document contains no pages"));
        }
        Ok(Self {
            pages,
            is_multi_page_source,
        })
    }

    /// A single raster image.
    pub fn single(page: RasterPage) -> Self {
        Self {
            pages: vec![page],
            is_multi_page_source: false,
        }
    }

    pub fn pages(&self) -> &[RasterPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when the input was a paginated format (PDF), even with one page.
    pub fn is_multi_page_source(&self) -> bool {
        self.is_multi_page_source
    }
}

/// The four corners of a detected text region, in image pixel coordinates.
///
/// Order: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad(pub [[f32; 2]; 4]);

impl Quad {
    pub fn top_left(&self) -> [f32; 2] {
        self.0[0]
    }

    pub fn top_right(&self) -> [f32; 2] {
        self.0[1]
    }

    pub fn bottom_right(&self) -> [f32; 2] {
        self.0[2]
    }

    pub fn bottom_left(&self) -> [f32; 2] {
        self.0[3]
    }

    /// Axis-aligned rectangle `(x, y, w, h)` as a quad.
    pub fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Quad([[x, y], [x + w, y], [x + w, y + h], [x, y + h]])
    }
}

/// A single line reported by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    /// Engine confidence in `[0, 1]`.
    pub confidence: f32,
    pub quad: Quad,
}

impl RecognizedLine {
    /// Build a line, clamping `confidence` into `[0, 1]`.
    pub fn new(text: impl Into<String>, confidence: f32, quad: Quad) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            text: text.into(),
            confidence,
            quad,
        }
    }
}

/// The recognised lines of one page, in engine order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    pub lines: Vec<RecognizedLine>,
}

impl PageResult {
    pub fn empty(page_num: usize) -> Self {
        Self {
            page_num,
            lines: Vec::new(),
        }
    }

    /// Arithmetic mean of line confidences; 0 when the page has no lines.
    pub fn confidence(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        self.confidence_sum() / self.lines.len() as f64
    }

    pub(crate) fn confidence_sum(&self) -> f64 {
        self.lines.iter().map(|l| l.confidence as f64).sum()
    }
}

/// Line texts across all pages, with separators between pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedTranscript {
    lines: Vec<String>,
    separator_count: usize,
}

impl AggregatedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Append [`PAGE_SEPARATOR`] as its own paragraph.
    pub fn push_separator(&mut self) {
        self.lines.push(String::new());
        self.lines.push(PAGE_SEPARATOR.to_string());
        self.lines.push(String::new());
        self.separator_count += 1;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of page separators injected.
    pub fn separator_count(&self) -> usize {
        self.separator_count
    }

    /// Lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Output of the page aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub transcript: AggregatedTranscript,
    pub pages: Vec<PageResult>,
    /// Percentage in `[0, 100]`, rounded to two decimals.
    pub confidence: f64,
    pub line_count: usize,
}

impl Aggregation {
    /// All recognised lines across pages, in order.
    pub fn lines(&self) -> impl Iterator<Item = &RecognizedLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    /// Whitespace-delimited tokens over every recognised line.
    pub fn word_count(&self) -> usize {
        self.lines().map(|l| l.text.split_whitespace().count()).sum()
    }
}

/// Heading counts by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureStats {
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
}

/// Markdown rendering of a transcript with inferred headings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredDocument {
    pub markdown: String,
    pub has_structure: bool,
    pub stats: StructureStats,
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
