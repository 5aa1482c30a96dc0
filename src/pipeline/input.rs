//! Input classification: decide whether a path is a PDF, an image, or junk.
//!
//! ## Why magic bytes first?
//!
//! Extensions lie — question papers arrive as `scan.pdf.jpg` or extension-less
//! downloads. Sniffing the leading bytes classifies the file by what it
//! actually is, and the extension is consulted only when the header matches
//! no known format. Rejecting unknown types here gives callers a meaningful
//! error instead of a pdfium crash or a confused API response.

use crate::error::Doc2QuizError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// What the uploaded file turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// A PDF document; goes through the text-then-raster pipeline.
    Pdf,
    /// A single image; encoded directly with its detected MIME type.
    Image { mime: &'static str },
}

/// Classify the file at `path`, validating existence and readability.
pub fn detect_kind(path: &Path) -> Result<DocumentKind, Doc2QuizError> {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Doc2QuizError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Doc2QuizError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    // WEBP needs 12 bytes (RIFF....WEBP); everything else fits in 4.
    let mut header = [0u8; 12];
    let read = file.read(&mut header).map_err(|e| {
        Doc2QuizError::Internal(format!(
            "Failed to read header of '{}': {e}",
            path.display()
        ))
    })?;

    if let Some(kind) = sniff(&header[..read]) {
        debug!("Detected {:?} for '{}'", kind, path.display());
        return Ok(kind);
    }

    if let Some(mime) = mime_from_extension(path) {
        debug!(
            "Header unrecognised; trusting extension of '{}' → {}",
            path.display(),
            mime
        );
        return Ok(DocumentKind::Image { mime });
    }

    let mut magic = [0u8; 4];
    let n = read.min(4);
    magic[..n].copy_from_slice(&header[..n]);
    Err(Doc2QuizError::UnsupportedFileType {
        path: path.to_path_buf(),
        magic,
    })
}

/// Classify by leading bytes alone. `None` when the header matches nothing.
fn sniff(header: &[u8]) -> Option<DocumentKind> {
    if header.starts_with(b"%PDF") {
        return Some(DocumentKind::Pdf);
    }
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some(DocumentKind::Image { mime: "image/png" });
    }
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(DocumentKind::Image { mime: "image/jpeg" });
    }
    if header.starts_with(b"GIF8") {
        return Some(DocumentKind::Image { mime: "image/gif" });
    }
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
        return Some(DocumentKind::Image { mime: "image/webp" });
    }
    None
}

/// Last-resort MIME lookup from the file extension.
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn detects_pdf_and_images_by_magic() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = write_temp(&dir, "doc.bin", b"%PDF-1.7 rest");
        assert_eq!(detect_kind(&pdf).unwrap(), DocumentKind::Pdf);

        let png = write_temp(&dir, "pic.bin", &[0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        assert_eq!(
            detect_kind(&png).unwrap(),
            DocumentKind::Image { mime: "image/png" }
        );

        let jpeg = write_temp(&dir, "photo.bin", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
        assert_eq!(
            detect_kind(&jpeg).unwrap(),
            DocumentKind::Image { mime: "image/jpeg" }
        );

        let webp = write_temp(&dir, "w.bin", b"RIFF\x00\x00\x00\x00WEBPVP8 ");
        assert_eq!(
            detect_kind(&webp).unwrap(),
            DocumentKind::Image { mime: "image/webp" }
        );
    }

    #[test]
    fn extension_fallback_when_header_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "odd.jpg", b"not a real header");
        assert_eq!(
            detect_kind(&path).unwrap(),
            DocumentKind::Image { mime: "image/jpeg" }
        );
    }

    #[test]
    fn unknown_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "notes.docx", &[0x50, 0x4B, 0x03, 0x04, 0x00]);
        let err = detect_kind(&path).unwrap_err();
        assert!(matches!(err, Doc2QuizError::UnsupportedFileType { .. }));
        assert!(err.to_string().contains("upload an image or a PDF"));
    }

    #[test]
    fn missing_file_reported() {
        let err = detect_kind(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Doc2QuizError::FileNotFound { .. }));
    }
}
