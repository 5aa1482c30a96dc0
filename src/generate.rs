//! Question generation: chunked model calls plus the end-to-end pipeline.
//!
//! The text path is a single request. The image path batches pages into
//! fixed-size chunks and sends them strictly one after another, so partial
//! progress is reportable and a failure stops the run instead of wasting
//! quota on in-flight requests.

use crate::config::GenerationConfig;
use crate::error::Doc2QuizError;
use crate::extract::{self, ExtractedContent};
use crate::gemini::GeminiClient;
use crate::model::Question;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

// ── Output ──────────────────────────────────────────────────────────────

/// Timing and volume figures for one end-to-end run.
#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    /// Image chunks sent; `0` on the text path.
    pub chunks: usize,
    /// Questions the model produced after sanitisation.
    pub question_count: usize,
    pub extract_ms: u64,
    pub generate_ms: u64,
    pub total_ms: u64,
}

/// Questions plus run statistics from [`generate_quiz`].
#[derive(Debug, Clone)]
pub struct QuizOutput {
    pub questions: Vec<Question>,
    pub stats: GenerationStats,
}

// ── Chunked generation ──────────────────────────────────────────────────

/// Chunks needed to send `items` images at `chunk_size` per request.
pub fn chunk_count(items: usize, chunk_size: usize) -> usize {
    items.div_ceil(chunk_size)
}

/// Run the model over extracted content and collect every question.
///
/// An empty result is not an error here: the caller decides how to present
/// a document that yielded nothing.
pub async fn generate_questions(
    content: &ExtractedContent,
    client: &GeminiClient,
    config: &GenerationConfig,
) -> Result<Vec<Question>, Doc2QuizError> {
    match content {
        ExtractedContent::Text(text) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_generation_start(0);
            }
            info!("Generating quiz from {} chars of text", text.len());
            client.generate_from_text(text).await
        }
        ExtractedContent::Images(images) => {
            let total_chunks = chunk_count(images.len(), config.chunk_size);
            if let Some(ref cb) = config.progress_callback {
                cb.on_generation_start(total_chunks);
            }
            info!(
                "Generating quiz from {} page images in {} chunks",
                images.len(),
                total_chunks
            );

            let mut questions = Vec::new();
            for (i, chunk) in images.chunks(config.chunk_size).enumerate() {
                debug!("Chunk {}/{}: {} images", i + 1, total_chunks, chunk.len());
                let mut batch = client.generate_from_images(chunk).await?;
                debug!("Chunk {}/{}: {} questions", i + 1, total_chunks, batch.len());
                questions.append(&mut batch);

                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_complete(i + 1, total_chunks);
                }
            }
            Ok(questions)
        }
    }
}

// ── End-to-end entry point ──────────────────────────────────────────────

/// Extract a document and generate a quiz from it, in one call.
pub async fn generate_quiz(
    path: impl AsRef<Path>,
    api_key: &str,
    config: &GenerationConfig,
) -> Result<QuizOutput, Doc2QuizError> {
    let path = path.as_ref();
    let started = Instant::now();
    info!("Quiz generation started: {}", path.display());

    // ── Step 1: extract content ────────────────────────────────────────

    let extract_started = Instant::now();
    let content = extract::extract_document(path, config).await?;
    let extract_ms = extract_started.elapsed().as_millis() as u64;

    // ── Step 2: generate questions ─────────────────────────────────────

    let client = GeminiClient::new(api_key, config)?;
    let generate_started = Instant::now();
    let questions = generate_questions(&content, &client, config).await?;
    let generate_ms = generate_started.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(questions.len());
    }

    let chunks = match &content {
        ExtractedContent::Text(_) => 0,
        ExtractedContent::Images(images) => chunk_count(images.len(), config.chunk_size),
    };
    let stats = GenerationStats {
        chunks,
        question_count: questions.len(),
        extract_ms,
        generate_ms,
        total_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        "Quiz generation finished: {} questions in {} ms",
        stats.question_count, stats.total_ms
    );

    Ok(QuizOutput { questions, stats })
}
