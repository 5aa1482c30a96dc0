//! Pipeline stages for turning an uploaded document into model-ready parts.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (sniff)   (pdfium)   (base64 JPEG)
//! ```
//!
//! 1. [`input`]  — classify the uploaded file as a PDF or a supported image
//! 2. [`render`] — extract per-page text, or rasterise pages when the text
//!    layer is too thin; runs in `spawn_blocking` because pdfium is not
//!    async-safe
//! 3. [`encode`] — JPEG-encode and base64-wrap each page for the multimodal
//!    API request body

pub mod encode;
pub mod input;
pub mod render;
