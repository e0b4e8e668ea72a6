//! Shared fixtures: a scripted recognition engine and in-memory images.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_ocr::{
    EngineError, EngineFactory, EngineRegistry, OcrError, OcrService, Quad, RecognitionEngine,
    RecognizedLine, ServiceConfig,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns the same lines for every page.
pub struct ScriptedEngine {
    lines: Vec<(String, f32)>,
}

impl RecognitionEngine for ScriptedEngine {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedLine>, EngineError> {
        Ok(self
            .lines
            .iter()
            .enumerate()
            .map(|(i, (text, conf))| {
                let y = i as f32 * 20.0;
                RecognizedLine::new(
                    text.clone(),
                    *conf,
                    Quad::from_rect(0.0, y, image.width() as f32, 18.0),
                )
            })
            .collect())
    }
}

pub struct BrokenEngine;

impl RecognitionEngine for BrokenEngine {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<RecognizedLine>, EngineError> {
        Err(EngineError::new("inference backend crashed"))
    }
}

/// Language `ru` yields a failing engine; `korean` fails to build.
pub struct StubFactory {
    lines: Vec<(String, f32)>,
    pub built: AtomicUsize,
}

impl StubFactory {
    pub fn new(lines: &[(&str, f32)]) -> Self {
        Self {
            lines: lines.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
            built: AtomicUsize::new(0),
        }
    }
}

impl EngineFactory for StubFactory {
    fn name(&self) -> &str {
        "stub"
    }

    fn create(&self, language: &str) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        self.built.fetch_add(1, Ordering::SeqCst);
        match language {
            "ru" => Ok(Arc::new(BrokenEngine)),
            "korean" => Err(OcrError::EngineInit {
                language: language.to_string(),
                detail: "no model".to_string(),
            }),
            _ => Ok(Arc::new(ScriptedEngine {
                lines: self.lines.clone(),
            })),
        }
    }
}

pub const CONTRACT_LINES: &[(&str, f32)] = &[
    ("ARTICLE PREMIER", 0.99),
    ("1. Premier Point", 0.95),
    ("a) Sous-point", 0.90),
    ("Texte normal.", 0.80),
];

pub fn service_with(lines: &[(&str, f32)], config: ServiceConfig) -> (OcrService, Arc<StubFactory>) {
    let factory = Arc::new(StubFactory::new(lines));
    let registry = Arc::new(EngineRegistry::new(factory.clone()));
    let service = OcrService::new(config, registry).expect("service");
    (service, factory)
}

pub fn service(lines: &[(&str, f32)]) -> OcrService {
    service_with(lines, ServiceConfig::default()).0
}

pub fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn png_base64() -> String {
    STANDARD.encode(png_bytes())
}

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", png_base64())
}

/// Whether tests needing a real libpdfium should run.
pub fn pdfium_enabled() -> bool {
    std::env::var("PDFIUM_TESTS").is_ok()
}

/// A two-page PDF with no text; pdfium rebuilds the missing xref table.
pub fn two_page_pdf() -> Vec<u8> {
    b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >> endobj
4 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >> endobj
trailer << /Root 1 0 R /Size 5 >>
%%EOF
"
    .to_vec()
}
