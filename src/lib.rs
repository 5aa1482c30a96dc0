//! # doc2quiz
//!
//! Turn a document into an interactive multiple-choice quiz.
//!
//! A user hands the library an image or a PDF; the Gemini API extracts the
//! multiple-choice questions it contains; the session controller runs the
//! quiz with scoring, history, and per-question review.
//!
//! ## Pipeline
//!
//! ```text
//! upload ──▶ extract ─────▶ generate ─────▶ session
//! (file)     (text layer,    (Gemini,        (reducer, scoring,
//!             page JPEGs)     4-page chunks)   history, review)
//! ```
//!
//! PDFs prefer their text layer; scanned or image-based PDFs fall back to
//! rendering every page as a JPEG. The image path batches pages four to a
//! request and sends chunks strictly in order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2quiz::{generate_quiz, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), doc2quiz::Doc2QuizError> {
//!     let config = GenerationConfig::builder()
//!         .model("gemini-2.5-flash")
//!         .build()?;
//!
//!     let output = generate_quiz("exam.pdf", "your-api-key", &config).await?;
//!     for question in &output.questions {
//!         println!("{} ({} options)", question.question_text, question.options.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `cli`   | yes     | Builds the `doc2quiz` terminal front end (clap, indicatif, tracing-subscriber, anyhow) |
//!
//! Library consumers can depend on the crate with `default-features =
//! false` and skip the terminal stack entirely.

// ── Modules ─────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod generate;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;
pub mod store;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::Doc2QuizError;
pub use extract::{extract_document, ExtractedContent};
pub use gemini::GeminiClient;
pub use generate::{chunk_count, generate_questions, generate_quiz, GenerationStats, QuizOutput};
pub use model::{Question, QuizResult, ResultStamp, Theme, UserAnswers};
pub use pipeline::encode::ImageData;
pub use pipeline::input::DocumentKind;
pub use progress::{
    NoopProgressCallback, ProcessingProgress, ProgressCallback, QuizProgressCallback,
};
pub use session::{update, ActiveQuiz, AppState, Effect, Msg, View, EMPTY_QUIZ_MESSAGE};
pub use store::{InMemoryStore, JsonPreferenceStore, PersistedPreferences, PreferenceStore};
