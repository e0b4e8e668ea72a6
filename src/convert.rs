//! End-to-end extraction entry points.
//!
//! [`OcrService`] owns the pieces that outlive a request (configuration,
//! HTTP client, engine registry) and runs one request through the pipeline:
//! resolve → aggregate → (optionally) structure → assemble. Any stage error
//! aborts the request and is returned as-is; nothing is cached on failure.

use crate::config::{self, ServiceConfig};
use crate::error::OcrError;
use crate::output::{Aggregation, Document};
use crate::pipeline::aggregate;
use crate::pipeline::input::{InputSource, SourceResolver};
use crate::pipeline::recognize::{EngineRegistry, RecognitionEngine};
use crate::pipeline::structure;
use crate::response::{self, MarkdownResponse, OcrResponse, SourceInfo};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The OCR pipeline with its long-lived collaborators.
#[derive(Debug)]
pub struct OcrService {
    config: ServiceConfig,
    resolver: SourceResolver,
    registry: Arc<EngineRegistry>,
}

impl OcrService {
    pub fn new(config: ServiceConfig, registry: Arc<EngineRegistry>) -> Result<Self, OcrError> {
        let resolver = SourceResolver::new(&config)?;
        Ok(Self {
            config,
            resolver,
            registry,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// The requested language, or the configured default when absent or blank.
    ///
    /// Codes outside [`SUPPORTED_LANGUAGES`](crate::SUPPORTED_LANGUAGES) are
    /// rejected with [`OcrError::InvalidInput`].
    pub fn resolve_language(&self, requested: Option<&str>) -> Result<String, OcrError> {
        let language = requested
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.config.default_language);
        config::check_language(language)?;
        Ok(language.to_string())
    }

    /// Build the default language's engine ahead of the first request.
    pub async fn warm_up(&self) -> Result<(), OcrError> {
        let language = self.config.default_language.clone();
        let start = Instant::now();
        self.engine_for(&language).await?;
        info!(
            "Engine for '{}' ready in {}ms",
            language,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Plain transcript with per-line details.
    pub async fn extract_text(
        &self,
        source: InputSource,
        language: Option<&str>,
    ) -> Result<OcrResponse, OcrError> {
        let language = self.resolve_language(language)?;
        let document = self.resolver.resolve(source).await?;
        let aggregation = self.recognize_document(document, &language).await?;
        Ok(response::assemble_text(&aggregation, &language))
    }

    /// Transcript plus Markdown with inferred headings.
    pub async fn extract_markdown(
        &self,
        source: InputSource,
        language: Option<&str>,
    ) -> Result<MarkdownResponse, OcrError> {
        let language = self.resolve_language(language)?;
        let label = source.label();
        let document = self.resolver.resolve(source).await?;
        let info = SourceInfo {
            label,
            page_count: document.page_count(),
            is_pdf: document.is_multi_page_source(),
        };

        let aggregation = self.recognize_document(document, &language).await?;
        let structured = structure::detect(&aggregation.transcript.text());
        info!(
            "Structure: {} h1 / {} h2 / {} h3",
            structured.stats.h1_count, structured.stats.h2_count, structured.stats.h3_count
        );

        Ok(response::assemble_markdown(
            &aggregation,
            structured,
            &language,
            &info,
        ))
    }

    /// Recognise every page of an already-resolved document.
    pub async fn recognize_document(
        &self,
        document: Document,
        language: &str,
    ) -> Result<Aggregation, OcrError> {
        let start = Instant::now();
        let pages = document.page_count();
        let engine = self.engine_for(language).await?;
        let aggregation = aggregate::aggregate(document, engine).await?;
        info!(
            "Recognised {} pages ({}) in {}ms",
            pages,
            language,
            start.elapsed().as_millis()
        );
        Ok(aggregation)
    }

    /// Engine construction loads models from disk, so it runs off the runtime.
    async fn engine_for(&self, language: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        config::check_language(language)?;
        let registry = Arc::clone(&self.registry);
        let language = language.to_string();
        tokio::task::spawn_blocking(move || registry.get_or_create(&language))
            .await
            .map_err(|e| OcrError::Internal(format!("Engine task panicked: {}", e)))?
    }
}
