//! # edgequake-ocr
//!
//! Extract text from images and PDFs with an OCR engine, and turn the
//! recognised lines into Markdown with inferred headings.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload / base64 / URL
//!  │
//!  ├─ 1. Input      pick the single input channel, fetch or decode it
//!  ├─ 2. Render     sniff %PDF, rasterise pages (pdfium) or decode the image → RGB
//!  ├─ 3. Recognize  per-language cached engine, one page at a time
//!  ├─ 4. Aggregate  page separators + line-weighted confidence
//!  ├─ 5. Structure  ordered heading heuristics → Markdown
//!  └─ 6. Respond    JSON contracts with counts and stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr::{EngineRegistry, InputSource, OcrService, ServiceConfig};
//! # use edgequake_ocr::{EngineFactory, OcrError, RecognitionEngine};
//! # use std::sync::Arc;
//! # struct MyFactory;
//! # impl EngineFactory for MyFactory {
//! #     fn name(&self) -> &str { "mine" }
//! #     fn create(&self, _: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError> { unimplemented!() }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(EngineRegistry::new(Arc::new(MyFactory)));
//!     let service = OcrService::new(ServiceConfig::default(), registry)?;
//!     let source = InputSource::Url("https://example.com/contract.pdf".into());
//!     let output = service.extract_markdown(source, Some("fr")).await?;
//!     println!("{}", output.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | axum HTTP surface (`/ocr`, `/ocr-markdown`, `/languages`) |
//! | `paddle` | off     | PaddleOCR engine via ONNX Runtime |
//! | `cli`    | off     | The `ocr-server` binary (implies `server` and `paddle`) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod response;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder, SUPPORTED_LANGUAGES};
pub use convert::OcrService;
pub use error::{EngineError, OcrError};
pub use output::{
    AggregatedTranscript, Aggregation, Document, PageResult, Quad, RasterPage, RecognizedLine,
    StructureStats, StructuredDocument, PAGE_SEPARATOR,
};
pub use pipeline::input::{InputSource, SourceFormat, SourceResolver};
pub use pipeline::recognize::{EngineFactory, EngineRegistry, RecognitionEngine};
pub use pipeline::structure::detect as detect_structure;
pub use response::{ErrorResponse, LanguagesResponse, MarkdownResponse, OcrResponse};
