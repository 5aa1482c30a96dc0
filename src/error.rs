//! Error types for the doc2quiz library.
//!
//! One fatal error type, [`Doc2QuizError`], covers the whole pipeline, but
//! its variants fall into two groups that the session controller treats
//! differently:
//!
//! * **Input rejection** (bad path, unsupported type, corrupt or protected
//!   PDF, no renderable pages) — reported inline at the upload step; the
//!   session never leaves the upload view.
//!
//! * **Generation failure** (API transport / auth trouble) — escalated to
//!   the global error view with an actionable message.
//!
//! Structural problems in an API response are deliberately *not* errors:
//! a malformed body degrades to an empty question list with a logged
//! warning, because an empty quiz is a valid, if unhelpful, outcome.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2quiz library.
#[derive(Debug, Error)]
pub enum Doc2QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is neither a PDF nor a recognised image format.
    #[error("Unsupported file type: '{path}' (first bytes: {magic:?})\nPlease upload an image or a PDF.")]
    UnsupportedFileType { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Failed to process the PDF '{path}': {detail}\nIt might be corrupted, protected, or an image-based PDF where rendering failed.")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; this pipeline does not take passwords.
    #[error("PDF '{path}' is encrypted and requires a password.\nDecrypt it first, e.g.: qpdf --decrypt --password=PW input.pdf output.pdf")]
    PasswordRequired { path: PathBuf },

    /// The image-fallback pass produced no pages at all.
    #[error("Failed to render any pages from the PDF as images: '{path}'")]
    NoPagesRendered { path: PathBuf },

    // ── Generation errors ─────────────────────────────────────────────────
    /// The Gemini API call failed at the transport or auth level.
    #[error("Failed to generate quiz from {input} due to an API error. Please check your API key and network connection.\nDetail: {detail}")]
    ApiFailure { input: String, detail: String },

    // ── Store errors ──────────────────────────────────────────────────────
    /// Could not create or write the preference file.
    #[error("Failed to write preferences to '{path}': {source}")]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2QuizError {
    /// True for errors the session reports inline at the upload step rather
    /// than escalating to the global error view.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Doc2QuizError::FileNotFound { .. }
                | Doc2QuizError::PermissionDenied { .. }
                | Doc2QuizError::UnsupportedFileType { .. }
                | Doc2QuizError::CorruptPdf { .. }
                | Doc2QuizError::PasswordRequired { .. }
                | Doc2QuizError::NoPagesRendered { .. }
        )
    }
}
