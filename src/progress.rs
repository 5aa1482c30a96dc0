//! Progress-callback trait for extraction and generation events.
//!
//! Inject an [`Arc<dyn QuizProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline reads pages and sends chunks.
//!
//! ## Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a progress bar, or a log sink without
//! the library knowing how the host application communicates. The trait is
//! `Send + Sync` because extraction runs on a blocking worker thread while
//! the caller awaits on the async runtime.

use std::sync::Arc;

/// Progress of a chunked operation: `current` of `total` units done.
///
/// `{0, 0}` denotes indeterminate progress (a single request whose duration
/// cannot be subdivided, such as text-path generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingProgress {
    pub current: usize,
    pub total: usize,
}

impl ProcessingProgress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// True when no meaningful `current/total` ratio exists.
    pub fn is_indeterminate(&self) -> bool {
        self.total == 0
    }
}

/// Called by the pipeline as it extracts pages and sends generation chunks.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Extraction events fire from a blocking worker
/// thread; generation events fire from the async task driving the requests.
pub trait QuizProgressCallback: Send + Sync {
    /// Called once when extraction begins and the page count is known.
    /// Direct image uploads report a single page.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page of the active extraction pass.
    ///
    /// Fires once per page during the text pass, and again per page during
    /// the raster pass when the pipeline falls back to images.
    fn on_page_extracted(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when the text pass yields too little and the raster pass
    /// starts over from page one.
    fn on_image_fallback(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called once when extraction has produced its result.
    fn on_extraction_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called once when generation begins. `total_chunks` is the number of
    /// image chunks to be sent, or 0 for the single-request text path.
    fn on_generation_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called after each chunk's response has been parsed, in chunk order.
    fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize) {
        let _ = (chunk_num, total_chunks);
    }

    /// Called once when generation finishes, with the total question count.
    fn on_generation_complete(&self, question_count: usize) {
        let _ = question_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl QuizProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn QuizProgressCallback>;
