//! HTTP server binary for edgequake-ocr.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ServiceConfig`, warms the default-language engine, and
//! serves the axum router.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocr::pipeline::paddle::PaddleFactory;
use edgequake_ocr::{server, EngineRegistry, OcrService, ServiceConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port with French models
  ocr-server --model-dir ./models

  # English by default, port 8080
  OCR_LANG=en PORT=8080 ocr-server --model-dir ./models

  # Upload an image
  curl -F image=@scan.png http://localhost:5000/ocr

  # Structured Markdown from a remote PDF
  curl -H 'Content-Type: application/json' \
       -d '{"url": "https://example.com/contract.pdf", "lang": "fr"}' \
       http://localhost:5000/ocr-markdown

MODEL LAYOUT:
  <model-dir>/det.onnx           text detection
  <model-dir>/cls.onnx           angle classification
  <model-dir>/<lang>/rec.onnx    recognition, per language
  <model-dir>/rec.onnx           recognition fallback

ENVIRONMENT VARIABLES:
  OCR_LANG          Default recognition language (fr)
  PORT              Listen port (5000)
  OCR_MODEL_DIR     PaddleOCR model directory
  PDFIUM_LIB_PATH   Directory containing libpdfium (else system library)
  RUST_LOG          Log filter, overrides --verbose
"#;

/// Serve image/PDF text extraction over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-server",
    version,
    about = "Serve image/PDF text extraction and Markdown structuring over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Listen address.
    #[arg(long, env = "OCR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Default recognition language.
    #[arg(short, long, env = "OCR_LANG", default_value = "fr")]
    lang: String,

    /// PaddleOCR model directory.
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "models")]
    model_dir: PathBuf,

    /// Inference threads per engine.
    #[arg(long, env = "OCR_THREADS", default_value_t = 4)]
    threads: usize,

    /// PDF rasterisation DPI (72–600).
    #[arg(long, env = "OCR_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// URL download timeout in seconds.
    #[arg(long, env = "OCR_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Maximum request body size in MiB.
    #[arg(long, env = "OCR_MAX_UPLOAD_MB", default_value_t = 32)]
    max_upload_mb: usize,

    /// Directory containing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Skip loading the default-language engine at startup.
    #[arg(long)]
    no_warm_up: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build service ────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    info!("Configuration: {:?}", config);

    let factory = PaddleFactory::new(&config.model_dir).with_threads(cli.threads);
    let registry = Arc::new(EngineRegistry::new(Arc::new(factory)));
    let service = OcrService::new(config, registry).context("Failed to build OCR service")?;

    if !cli.no_warm_up {
        info!("Loading recognition models ({})…", cli.lang);
        service
            .warm_up()
            .await
            .context("Failed to load default-language models")?;
    }

    // ── Serve ────────────────────────────────────────────────────────────
    server::serve(service, &cli.host, cli.port)
        .await
        .context("Server failed")?;

    Ok(())
}

/// Map CLI args to `ServiceConfig`.
fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .default_language(&cli.lang)
        .dpi(cli.dpi)
        .download_timeout_secs(cli.download_timeout)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024))
        .model_dir(&cli.model_dir);

    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid configuration")
}
