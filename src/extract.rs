//! Content extraction: decides what a document yields for question
//! generation.
//!
//! Uploaded images pass straight through to base64. PDFs get a text-layer
//! pass first; only when the text layer is effectively empty (a scanned or
//! image-based PDF) does the expensive raster fallback run.
//!
//! ## Why text-first?
//!
//! A text request is one API call regardless of page count, while the image
//! path sends every page and pays per chunk. Trying the cheap path first
//! also gives the model cleaner input: a real text layer beats OCR-from-JPEG
//! for anything that was born digital.

use crate::config::GenerationConfig;
use crate::error::Doc2QuizError;
use crate::pipeline::encode::{self, ImageData};
use crate::pipeline::input::{self, DocumentKind};
use crate::pipeline::render;
use std::path::Path;
use tracing::info;

/// Model-ready content produced by [`extract_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// The document's text layer, trimmed and joined across pages.
    Text(String),
    /// One base64 JPEG per rendered page, or the uploaded image itself.
    Images(Vec<ImageData>),
}

/// Turn an uploaded file into model-ready content.
///
/// Images are encoded as-is. PDFs prefer their text layer and fall back to
/// rendering pages as JPEGs when the trimmed text is no longer than
/// `min_text_len`.
pub async fn extract_document(
    path: &Path,
    config: &GenerationConfig,
) -> Result<ExtractedContent, Doc2QuizError> {
    // ── Step 1: classify the upload ────────────────────────────────────

    let kind = input::detect_kind(path)?;
    info!("Upload classified as {:?}: {}", kind, path.display());

    match kind {
        DocumentKind::Image { mime } => extract_image(path, mime, config),
        DocumentKind::Pdf => extract_pdf(path, config).await,
    }
}

fn extract_image(
    path: &Path,
    mime: &'static str,
    config: &GenerationConfig,
) -> Result<ExtractedContent, Doc2QuizError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(1);
    }

    let image = encode::encode_image_file(path, mime)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_page_extracted(1, 1);
        cb.on_extraction_complete(1);
    }
    Ok(ExtractedContent::Images(vec![image]))
}

async fn extract_pdf(
    path: &Path,
    config: &GenerationConfig,
) -> Result<ExtractedContent, Doc2QuizError> {
    // ── Step 2: text-layer pass ────────────────────────────────────────

    let (text, total_pages) = render::extract_text(path, config).await?;
    let trimmed = text.trim();

    if trimmed.len() > config.min_text_len {
        info!(
            "Text layer sufficient ({} chars across {} pages)",
            trimmed.len(),
            total_pages
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_extraction_complete(total_pages);
        }
        return Ok(ExtractedContent::Text(trimmed.to_string()));
    }

    // ── Step 3: raster fallback for image-based PDFs ───────────────────

    info!(
        "Text layer too thin ({} chars); rasterising {} pages",
        trimmed.len(),
        total_pages
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_image_fallback(total_pages);
    }

    let images = render::render_page_images(path, config).await?;
    if images.is_empty() {
        return Err(Doc2QuizError::NoPagesRendered {
            path: path.to_path_buf(),
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(total_pages);
    }
    Ok(ExtractedContent::Images(images))
}
