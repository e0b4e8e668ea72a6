//! Rasterisation: turn source bytes into RGB [`RasterPage`]s.
//!
//! PDFs are rendered page-by-page through pdfium; every other payload is
//! handed to the `image` crate. Either way the result is normalised to
//! 8-bit RGB so the recognition engine never sees alpha, palettes, or
//! 16-bit channels.
//!
//! pdfium wraps a C++ library with thread-local state, so PDF rendering runs
//! inside `tokio::task::spawn_blocking` and never on a runtime worker thread.

use crate::error::OcrError;
use crate::output::RasterPage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Parameters for PDF rasterisation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dpi: u32,
    pub max_rendered_pixels: u32,
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            pdfium_lib_path: None,
        }
    }
}

/// Decode a raster image (PNG, JPEG, TIFF, …) into a single RGB page.
pub fn decode_image(bytes: &[u8]) -> Result<RasterPage, OcrError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| OcrError::decode(format!("unreadable image: {e}")))?;
    debug!("Decoded image {}x{} ({:?})", img.width(), img.height(), img.color());
    Ok(RasterPage::new(img.to_rgb8()))
}

/// Rasterise every page of a PDF, preserving page order.
pub async fn rasterise_pdf(
    bytes: Vec<u8>,
    options: &RenderOptions,
) -> Result<Vec<RasterPage>, OcrError> {
    let options = options.clone();

    tokio::task::spawn_blocking(move || rasterise_pdf_blocking(&bytes, &options))
        .await
        .map_err(|e| OcrError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of PDF rasterisation.
fn rasterise_pdf_blocking(
    bytes: &[u8],
    options: &RenderOptions,
) -> Result<Vec<RasterPage>, OcrError> {
    let pdfium = bind_pdfium(options.pdfium_lib_path.as_deref())?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| OcrError::decode(format!("PDF could not be opened: {:?}", e)))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages at {} DPI", total_pages, options.dpi);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(options.dpi as f32 / 72.0)
        .set_maximum_width(options.max_rendered_pixels as i32)
        .set_maximum_height(options.max_rendered_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            OcrError::decode(format!("rasterisation failed for page {}: {:?}", idx + 1, e))
        })?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(RasterPage::new(image));
    }

    Ok(results)
}

/// Bind to libpdfium, from `lib_path` when given, else the system library.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, OcrError> {
    let bindings = match lib_path {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| OcrError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
