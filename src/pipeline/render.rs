//! PDF access via pdfium: per-page text extraction and page rasterisation.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread-pool thread designed for blocking operations, preventing the
//! Tokio worker threads from stalling during CPU-heavy rendering.
//!
//! ## Why scale from point size, with a pixel cap?
//!
//! The raster pass targets 1.5× of each page's point width — enough for the
//! model to read body text, small enough that four JPEG pages fit one
//! request. `max_rendered_pixels` caps the longest edge regardless of
//! physical page size so a poster-sized page cannot exhaust memory.

use crate::config::GenerationConfig;
use crate::error::Doc2QuizError;
use crate::pipeline::encode::{self, ImageData};
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract the text layer of every page, joined with paragraph separators.
///
/// Returns the concatenated text and the page count (needed by the caller
/// to drive the raster fallback). Pages whose text layer cannot be read
/// contribute an empty string rather than failing the pass.
pub async fn extract_text(
    pdf_path: &Path,
    config: &GenerationConfig,
) -> Result<(String, usize), Doc2QuizError> {
    let path = pdf_path.to_path_buf();
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || extract_text_blocking(&path, progress))
        .await
        .map_err(|e| Doc2QuizError::Internal(format!("Text extraction task panicked: {e}")))?
}

fn extract_text_blocking(
    pdf_path: &Path,
    progress: Option<ProgressCallback>,
) -> Result<(String, usize), Doc2QuizError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if let Some(ref cb) = progress {
        cb.on_extraction_start(total_pages);
    }

    let mut page_texts = Vec::with_capacity(total_pages);
    for idx in 0..total_pages {
        let text = match pages.get(idx as u16).and_then(|page| page.text().map(|t| t.all())) {
            Ok(t) => t,
            Err(e) => {
                warn!("Page {}: text layer unreadable: {:?}", idx + 1, e);
                String::new()
            }
        };
        debug!("Page {}: {} chars of text", idx + 1, text.len());
        page_texts.push(text);

        if let Some(ref cb) = progress {
            cb.on_page_extracted(idx + 1, total_pages);
        }
    }

    Ok((page_texts.join("\n\n"), total_pages))
}

/// Rasterise every page to a base64 JPEG at the configured scale.
///
/// Pages that fail to render or encode are skipped with a warning; the
/// caller decides whether an empty result is fatal.
pub async fn render_page_images(
    pdf_path: &Path,
    config: &GenerationConfig,
) -> Result<Vec<ImageData>, Doc2QuizError> {
    let path = pdf_path.to_path_buf();
    let scale = config.render_scale;
    let max_pixels = config.max_rendered_pixels;
    let quality = config.jpeg_quality;
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        render_page_images_blocking(&path, scale, max_pixels, quality, progress)
    })
    .await
    .map_err(|e| Doc2QuizError::Internal(format!("Render task panicked: {e}")))?
}

fn render_page_images_blocking(
    pdf_path: &Path,
    scale: f32,
    max_pixels: u32,
    quality: u8,
    progress: Option<ProgressCallback>,
) -> Result<Vec<ImageData>, Doc2QuizError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        match render_single_page(&pages, idx, scale, max_pixels, quality) {
            Ok(image) => results.push(image),
            Err(detail) => warn!("Page {}: skipped: {detail}", idx + 1),
        }

        if let Some(ref cb) = progress {
            cb.on_page_extracted(idx + 1, total_pages);
        }
    }

    info!("Rendered {}/{} pages as images", results.len(), total_pages);
    Ok(results)
}

fn render_single_page(
    pages: &PdfPages<'_>,
    idx: usize,
    scale: f32,
    max_pixels: u32,
    quality: u8,
) -> Result<ImageData, String> {
    let page = pages.get(idx as u16).map_err(|e| format!("{e:?}"))?;

    let target_width = ((page.width().value * scale).round() as u32).min(max_pixels);
    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width as i32)
        .set_maximum_height(max_pixels as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("rasterisation failed: {e:?}"))?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        idx + 1,
        image.width(),
        image.height()
    );

    encode::encode_page(&image, quality).map_err(|e| format!("JPEG encoding failed: {e}"))
}

/// Open a PDF, mapping pdfium's load errors onto the input-rejection
/// taxonomy. This pipeline never takes a password, so any password-flavoured
/// failure means the document is encrypted.
fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, Doc2QuizError> {
    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            Doc2QuizError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            Doc2QuizError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}
