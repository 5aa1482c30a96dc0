//! Configuration types for document-to-quiz generation.
//!
//! All pipeline behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share configs across threads, log them, and diff two
//! runs to understand why their outputs differ.
//!
//! ## Why a builder?
//!
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Doc2QuizError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for a document-to-quiz generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2quiz::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gemini-2.5-flash")
///     .chunk_size(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Gemini model identifier. Default: "gemini-2.5-flash".
    ///
    /// Flash is the right default for extraction work: it reads page images
    /// reliably at a fraction of the pro-tier price, and the response schema
    /// does the heavy lifting on output structure.
    pub model: String,

    /// Base URL of the generative-language endpoint.
    /// Default: `https://generativelanguage.googleapis.com`.
    ///
    /// Override to point at a proxy or a regional endpoint. The request path
    /// (`/v1beta/models/{model}:generateContent`) is appended to this.
    pub base_url: String,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to what is on the page,
    /// which is what extraction needs. Higher values introduce creativity
    /// that invents questions instead of transcribing them.
    pub temperature: f32,

    /// Maximum tokens the model may generate per request. Default: None
    /// (service default).
    ///
    /// A dense question paper can produce dozens of questions per chunk;
    /// capping output too low silently truncates the JSON mid-array, which
    /// then degrades to an empty chunk at parse time.
    pub max_output_tokens: Option<usize>,

    /// Maximum page images bundled into one generation request. Default: 4.
    ///
    /// Larger batches press against the service's per-request payload and
    /// attention limits, degrading both accuracy and reliability. Four pages
    /// keeps each request comfortably inside that envelope.
    pub chunk_size: usize,

    /// Trimmed text length above which the text pass wins. Default: 10.
    ///
    /// A scanned PDF typically yields zero or a handful of stray characters
    /// from metadata; ten characters separates "real text layer" from
    /// "noise" without ever misclassifying an actual question paper.
    pub min_text_len: usize,

    /// Raster scale applied to each page's point size. Default: 1.5.
    ///
    /// 1.5× of the PDF point size keeps body text sharp enough for the
    /// model to read reliably while the JPEG payload stays small enough
    /// that four pages fit one request.
    pub render_scale: f32,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 4000.
    ///
    /// A safety cap independent of scale: a poster-sized page at 1.5×
    /// could otherwise exhaust memory. This caps either dimension, scaling
    /// the other proportionally.
    pub max_rendered_pixels: u32,

    /// JPEG quality for rendered pages, 1–100. Default: 90.
    ///
    /// Quality 90 is visually lossless for rendered text at 1.5× scale and
    /// roughly a fifth the bytes of PNG, which matters when four pages ride
    /// in one request body.
    pub jpeg_quality: u8,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional progress callback receiving extraction and generation
    /// events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.2,
            max_output_tokens: None,
            chunk_size: 4,
            min_text_len: 10,
            render_scale: 1.5,
            max_rendered_pixels: 4000,
            jpeg_quality: 90,
            api_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("chunk_size", &self.chunk_size)
            .field("min_text_len", &self.min_text_len)
            .field("render_scale", &self.render_scale)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn QuizProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n.max(1);
        self
    }

    pub fn min_text_len(mut self, n: usize) -> Self {
        self.config.min_text_len = n;
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.5, 4.0);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, Doc2QuizError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(Doc2QuizError::InvalidConfig(
                "Chunk size must be ≥ 1".into(),
            ));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(Doc2QuizError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !(c.render_scale > 0.0) {
            return Err(Doc2QuizError::InvalidConfig(format!(
                "Render scale must be positive, got {}",
                c.render_scale
            )));
        }
        if c.model.is_empty() {
            return Err(Doc2QuizError::InvalidConfig("Model must not be empty".into()));
        }
        Ok(self.config)
    }
}
