//! PaddleOCR recognition engine via ONNX Runtime (`paddle-ocr-rs`).
//!
//! Model layout under the configured model directory:
//!
//! ```text
//! <model_dir>/det.onnx          text detection (shared)
//! <model_dir>/cls.onnx          angle classification (shared)
//! <model_dir>/<lang>/rec.onnx   recognition for one language
//! <model_dir>/rec.onnx          fallback recognition model
//! ```
//!
//! `OcrLite::detect` needs `&mut self`, so each engine guards its instance
//! with a `Mutex`; concurrent requests for the same language take turns.

use crate::error::{EngineError, OcrError};
use crate::output::{Quad, RecognizedLine};
use crate::pipeline::recognize::{EngineFactory, RecognitionEngine};
use image::RgbImage;
use paddle_ocr_rs::ocr_lite::OcrLite;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const DET_MODEL_NAME: &str = "det.onnx";
const CLS_MODEL_NAME: &str = "cls.onnx";
const REC_MODEL_NAME: &str = "rec.onnx";

/// Detector tuning, matching PaddleOCR's defaults.
const PADDING: u32 = 50;
const MAX_SIDE_LEN: u32 = 1024;
const BOX_SCORE_THRESH: f32 = 0.5;
const BOX_THRESH: f32 = 0.3;
const UNCLIP_RATIO: f32 = 1.6;

/// Builds one [`PaddleEngine`] per language from a model directory.
#[derive(Debug, Clone)]
pub struct PaddleFactory {
    model_dir: PathBuf,
    num_threads: usize,
}

impl PaddleFactory {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            num_threads: 4,
        }
    }

    pub fn with_threads(mut self, n: usize) -> Self {
        self.num_threads = n.max(1);
        self
    }

    /// Resolve `(det, cls, rec)` model paths for `language`.
    fn model_paths(&self, language: &str) -> Result<(PathBuf, PathBuf, PathBuf), OcrError> {
        let missing = |path: &Path| OcrError::EngineInit {
            language: language.to_string(),
            detail: format!("model file not found: {}", path.display()),
        };

        if !is_plain_dir_name(language) {
            return Err(OcrError::InvalidInput {
                input: format!("lang={language}"),
                reason: "language code must be a plain directory name".to_string(),
            });
        }

        let det = self.model_dir.join(DET_MODEL_NAME);
        let cls = self.model_dir.join(CLS_MODEL_NAME);
        if !det.exists() {
            return Err(missing(&det));
        }
        if !cls.exists() {
            return Err(missing(&cls));
        }

        let lang_rec = self.model_dir.join(language).join(REC_MODEL_NAME);
        if lang_rec.exists() {
            return Ok((det, cls, lang_rec));
        }

        let shared_rec = self.model_dir.join(REC_MODEL_NAME);
        if shared_rec.exists() {
            warn!(
                "No recognition model for '{}', using {}",
                language,
                shared_rec.display()
            );
            return Ok((det, cls, shared_rec));
        }

        Err(missing(&lang_rec))
    }
}

/// One normal path component: no separators, no `.`/`..`, not absolute.
fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

impl EngineFactory for PaddleFactory {
    fn name(&self) -> &str {
        "paddleocr"
    }

    fn create(&self, language: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        let (det, cls, rec) = self.model_paths(language)?;

        let mut ocr = OcrLite::new();
        ocr.init_models(
            &det.to_string_lossy(),
            &cls.to_string_lossy(),
            &rec.to_string_lossy(),
            self.num_threads,
        )
        .map_err(|e| OcrError::EngineInit {
            language: language.to_string(),
            detail: e.to_string(),
        })?;

        info!("PaddleOCR models loaded for '{}' from {}", language, rec.display());

        Ok(Arc::new(PaddleEngine {
            ocr: Mutex::new(ocr),
        }))
    }
}

/// A loaded PaddleOCR pipeline for one language.
pub struct PaddleEngine {
    ocr: Mutex<OcrLite>,
}

impl RecognitionEngine for PaddleEngine {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedLine>, EngineError> {
        let mut ocr = self
            .ocr
            .lock()
            .map_err(|e| EngineError::new(format!("engine lock poisoned: {e}")))?;

        let result = ocr
            .detect(
                image,
                PADDING,
                MAX_SIDE_LEN,
                BOX_SCORE_THRESH,
                BOX_THRESH,
                UNCLIP_RATIO,
                true,  // do angle
                false, // most angle
            )
            .map_err(|e| EngineError::new(format!("PaddleOCR detection failed: {e}")))?;

        let lines = result
            .text_blocks
            .iter()
            .filter(|block| !block.text.trim().is_empty())
            .map(|block| {
                let mut corners = [[0.0f32; 2]; 4];
                for (corner, point) in corners.iter_mut().zip(block.box_points.iter()) {
                    *corner = [point.x as f32, point.y as f32];
                }
                RecognizedLine::new(block.text.clone(), block.text_score, Quad(corners))
            })
            .collect();

        Ok(lines)
    }
}
