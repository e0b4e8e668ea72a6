//! Recognition adapter: wraps the external OCR engine behind a trait and
//! caches one engine instance per language.
//!
//! The [`EngineRegistry`] is the only state shared between requests. It is
//! read-mostly once warmed up: lookups take a read lock, and only the first
//! request for a new language takes the write lock. Construction itself runs
//! outside the lock, so two requests racing on an uncached language may both
//! build an engine; the first insert wins and the loser's instance is
//! dropped. Nothing is ever evicted.

use crate::error::{EngineError, OcrError};
use crate::output::{PageResult, RasterPage, RecognizedLine};
use image::RgbImage;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// An OCR engine bound to one language.
///
/// Returns the recognised lines of a raster in reading order. An image with
/// no text yields an empty vector, not an error.
pub trait RecognitionEngine: Send + Sync {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedLine>, EngineError>;
}

/// Builds engines on demand for the registry.
pub trait EngineFactory: Send + Sync {
    /// Short identifier reported by the health endpoint.
    fn name(&self) -> &str;

    fn create(&self, language: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError>;
}

/// Process-wide, language-keyed cache of recognition engines.
pub struct EngineRegistry {
    factory: Arc<dyn EngineFactory>,
    engines: RwLock<HashMap<String, Arc<dyn RecognitionEngine>>>,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("factory", &self.factory.name())
            .field("languages", &self.languages())
            .finish()
    }
}

impl EngineRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engines: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine_name(&self) -> &str {
        self.factory.name()
    }

    /// Return the cached engine for `language`, building it on first use.
    pub fn get_or_create(&self, language: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        if let Some(engine) = self.lookup(language)? {
            return Ok(engine);
        }

        info!("Initialising recognition engine for language '{}'", language);
        let built = self.factory.create(language)?;

        let mut engines = self
            .engines
            .write()
            .map_err(|_| OcrError::Internal("engine registry lock poisoned".into()))?;
        let engine = engines
            .entry(language.to_string())
            .or_insert(built)
            .clone();
        Ok(engine)
    }

    /// Languages with a cached engine, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .engines
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        langs.sort();
        langs
    }

    fn lookup(&self, language: &str) -> Result<Option<Arc<dyn RecognitionEngine>>, OcrError> {
        let engines = self
            .engines
            .read()
            .map_err(|_| OcrError::Internal("engine registry lock poisoned".into()))?;
        Ok(engines.get(language).cloned())
    }
}

/// Recognise one page; `page_num` is 1-indexed and only used for diagnostics.
pub fn recognize(
    engine: &dyn RecognitionEngine,
    page: &RasterPage,
    page_num: usize,
) -> Result<PageResult, OcrError> {
    let lines = engine
        .recognize(page.image())
        .map_err(|e| OcrError::RecognitionError {
            page: page_num,
            detail: e.to_string(),
        })?;

    debug!("Page {}: {} lines recognised", page_num, lines.len());

    Ok(PageResult { page_num, lines })
}
