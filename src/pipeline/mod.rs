//! Pipeline stages for image/PDF-to-text extraction.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own and the recognition backend can be swapped
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ aggregate (recognize) ──▶ structure
//! (channel)  (pdfium)   (per page, in order)      (headings)
//! ```
//!
//! 1. [`input`]     — pick the request's single input channel, fetch or decode
//!    it, and sniff PDF vs. raster image
//! 2. [`render`]    — rasterise PDF pages or decode the image, always to RGB
//! 3. [`recognize`] — language-keyed engine registry and the per-page adapter
//! 4. [`aggregate`] — sequential per-page recognition, page separators, and
//!    line-weighted confidence
//! 5. [`structure`] — ordered heading heuristics producing Markdown

pub mod aggregate;
pub mod input;
#[cfg(feature = "paddle")]
pub mod paddle;
pub mod recognize;
pub mod render;
pub mod structure;
