//! Image encoding: rendered pages and uploaded images → base64 `ImageData`.
//!
//! The Gemini API accepts images as base64 `inlineData` parts in the JSON
//! request body. Rendered pages are encoded as JPEG: at quality 90 the
//! result is visually lossless for rasterised text while weighing roughly a
//! fifth of the equivalent PNG, which matters when four pages ride in one
//! request. Directly uploaded images are passed through byte-for-byte with
//! their detected MIME type — re-encoding a user's JPEG would only stack
//! compression artefacts.

use crate::error::Doc2QuizError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// A base64 payload plus its MIME type, ready for an `inlineData` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub data: String,
    /// MIME type of the encoded bytes, e.g. `image/jpeg`.
    pub mime_type: String,
}

/// Encode a rasterised page as base64 JPEG at the given quality.
///
/// pdfium hands back RGBA bitmaps; JPEG has no alpha channel, so the image
/// is flattened to RGB first.
pub fn encode_page(img: &DynamicImage, quality: u8) -> Result<ImageData, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page → {} bytes base64 (q={quality})", b64.len());

    Ok(ImageData {
        data: b64,
        mime_type: "image/jpeg".to_string(),
    })
}

/// Read an uploaded image file and wrap its raw bytes as base64.
pub fn encode_image_file(path: &Path, mime: &str) -> Result<ImageData, Doc2QuizError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Doc2QuizError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Doc2QuizError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(Doc2QuizError::Internal(format!(
                "Failed to read '{}': {e}",
                path.display()
            )));
        }
    };

    let b64 = STANDARD.encode(&bytes);
    debug!(
        "Encoded upload '{}' → {} bytes base64 ({mime})",
        path.display(),
        b64.len()
    );

    Ok(ImageData {
        data: b64,
        mime_type: mime.to_string(),
    })
}
