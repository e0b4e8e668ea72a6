//! Page aggregation: recognise every page in order and stitch the results
//! into one transcript.
//!
//! Pages are processed strictly sequentially. The separator placement and
//! line ordering of the transcript depend on it, and a single engine
//! instance is shared across concurrent requests anyway.

use crate::error::OcrError;
use crate::output::{round2, AggregatedTranscript, Aggregation, Document, PageResult};
use crate::pipeline::recognize::{self, RecognitionEngine};
use std::sync::Arc;
use tracing::{debug, info};

/// Recognise all pages of `document` with `engine`.
///
/// Runs inside `spawn_blocking`: recognition is CPU-bound inference.
pub async fn aggregate(
    document: Document,
    engine: Arc<dyn RecognitionEngine>,
) -> Result<Aggregation, OcrError> {
    tokio::task::spawn_blocking(move || aggregate_blocking(&document, engine.as_ref()))
        .await
        .map_err(|e| OcrError::Internal(format!("Recognition task panicked: {}", e)))?
}

/// Blocking implementation of page aggregation.
///
/// The first page failure aborts the whole aggregation.
pub fn aggregate_blocking(
    document: &Document,
    engine: &dyn RecognitionEngine,
) -> Result<Aggregation, OcrError> {
    let total_pages = document.page_count();
    let mut transcript = AggregatedTranscript::new();
    let mut pages: Vec<PageResult> = Vec::with_capacity(total_pages);

    for (idx, page) in document.pages().iter().enumerate() {
        let page_num = idx + 1;
        let result = recognize::recognize(engine, page, page_num)?;

        for line in &result.lines {
            transcript.push_line(line.text.clone());
        }

        if document.is_multi_page_source() && page_num < total_pages {
            transcript.push_separator();
        }

        debug!(
            "Page {}/{}: confidence {:.3}",
            page_num,
            total_pages,
            result.confidence()
        );
        pages.push(result);
    }

    let line_count: usize = pages.iter().map(|p| p.lines.len()).sum();
    let confidence = overall_confidence(&pages);

    info!(
        "Aggregated {} pages: {} lines, {:.2}% confidence",
        total_pages, line_count, confidence
    );

    Ok(Aggregation {
        transcript,
        pages,
        confidence,
        line_count,
    })
}

/// Mean line confidence across all pages as a percentage, two decimals.
///
/// Weighted by line, not by page: a page with ten lines counts ten times as
/// much as a page with one. Zero when no page has any line.
pub fn overall_confidence(pages: &[PageResult]) -> f64 {
    let line_count: usize = pages.iter().map(|p| p.lines.len()).sum();
    if line_count == 0 {
        return 0.0;
    }
    let sum: f64 = pages.iter().map(PageResult::confidence_sum).sum();
    round2(100.0 * sum / line_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::output::{Quad, RasterPage, RecognizedLine, PAGE_SEPARATOR};
    use image::RgbImage;

    /// Reads lines for a page from its width: page `n` is `n` pixels wide.
    struct ByWidth(Vec<Vec<(&'static str, f32)>>);

    impl RecognitionEngine for ByWidth {
        fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedLine>, EngineError> {
            let idx = image.width() as usize - 1;
            let lines = self
                .0
                .get(idx)
                .ok_or_else(|| EngineError::new(format!("no script for page {}", idx + 1)))?;
            Ok(lines
                .iter()
                .map(|(t, c)| RecognizedLine::new(*t, *c, Quad::default()))
                .collect())
        }
    }

    fn doc(pages: usize, multi: bool) -> Document {
        let pages = (1..=pages as u32)
            .map(|w| RasterPage::new(RgbImage::new(w, 1)))
            .collect();
        Document::new(pages, multi).unwrap()
    }

    #[test]
    fn separators_only_between_pages() {
        let engine = ByWidth(vec![
            vec![("one", 0.9)],
            vec![("two", 0.8)],
            vec![("three", 0.7)],
        ]);
        let agg = aggregate_blocking(&doc(3, true), &engine).unwrap();
        assert_eq!(agg.transcript.separator_count(), 2);
        assert_eq!(agg.transcript.text(), "one\n\n---\n\ntwo\n\n---\n\nthree");
        let lines = agg.transcript.lines();
        assert_ne!(lines.first().map(String::as_str), Some(PAGE_SEPARATOR));
        assert_ne!(lines.last().map(String::as_str), Some(PAGE_SEPARATOR));
    }

    #[test]
    fn single_page_pdf_has_no_separator() {
        let engine = ByWidth(vec![vec![("only", 1.0)]]);
        let agg = aggregate_blocking(&doc(1, true), &engine).unwrap();
        assert_eq!(agg.transcript.separator_count(), 0);
        assert_eq!(agg.transcript.text(), "only");
    }

    #[test]
    fn empty_pages_still_separated() {
        let engine = ByWidth(vec![vec![], vec![("b", 0.5)]]);
        let agg = aggregate_blocking(&doc(2, true), &engine).unwrap();
        assert_eq!(agg.transcript.separator_count(), 1);
        assert_eq!(agg.line_count, 1);
        assert_eq!(agg.confidence, 50.0);
    }

    #[test]
    fn confidence_is_weighted_by_line() {
        let engine = ByWidth(vec![
            vec![("a", 0.9), ("b", 0.8), ("c", 0.7)],
            vec![("d", 0.2)],
        ]);
        let agg = aggregate_blocking(&doc(2, true), &engine).unwrap();
        // (0.9 + 0.8 + 0.7 + 0.2) / 4 = 0.65
        assert_eq!(agg.confidence, 65.0);
        assert_eq!(agg.line_count, 4);
    }

    #[test]
    fn no_lines_means_zero_confidence() {
        let engine = ByWidth(vec![vec![], vec![]]);
        let agg = aggregate_blocking(&doc(2, true), &engine).unwrap();
        assert_eq!(agg.confidence, 0.0);
        assert_eq!(agg.line_count, 0);
        assert_eq!(overall_confidence(&[]), 0.0);
    }

    #[test]
    fn failure_on_any_page_aborts() {
        let engine = ByWidth(vec![vec![("a", 0.9)]]);
        let err = aggregate_blocking(&doc(2, true), &engine).unwrap_err();
        assert!(matches!(err, OcrError::RecognitionError { page: 2, .. }));
    }

    #[tokio::test]
    async fn async_wrapper_matches_blocking() {
        let engine: Arc<dyn RecognitionEngine> = Arc::new(ByWidth(vec![vec![("x y z", 0.333)]]));
        let agg = aggregate(doc(1, false), engine).await.unwrap();
        assert_eq!(agg.confidence, 33.3);
        assert_eq!(agg.word_count(), 3);
    }
}
