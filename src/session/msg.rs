use crate::model::{Question, ResultStamp, Theme};
use crate::progress::ProcessingProgress;
use std::path::PathBuf;

/// Everything that can happen to the application, user intent and pipeline
/// events alike. The driver turns input and pipeline callbacks into these;
/// `update` consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a name on the login screen.
    LoginSubmitted(String),
    /// User logged out. History and theme survive, identity does not.
    LoggedOut,
    /// User saved an API key on the key-setup screen.
    ApiKeySubmitted(String),
    /// User discarded the stored API key.
    ApiKeyCleared,
    /// User asked to build a new quiz (dashboard → upload).
    NewQuizRequested,
    /// User navigated back to the dashboard.
    DashboardRequested,
    /// User picked a document on the upload screen.
    FileChosen(PathBuf),
    /// Page-level progress from the extraction stage.
    ExtractionProgress(ProcessingProgress),
    /// Extraction rejected the input (bad type, corrupt or protected PDF).
    /// Shown inline on the upload screen.
    ExtractionRejected { message: String },
    /// Generation began; `total_chunks` is `0` on the single-request text
    /// path, which renders as indeterminate progress.
    GenerationStarted { total_chunks: usize },
    /// Chunk-level progress from the generation stage.
    GenerationProgress(ProcessingProgress),
    /// The pipeline finished. An empty list is a content-quality failure,
    /// not a transport one.
    GenerationFinished { questions: Vec<Question> },
    /// The pipeline failed hard (API, network, or an internal fault).
    PipelineFailed { message: String },
    /// User picked an answer option on the current question.
    AnswerSelected(usize),
    /// User advanced past an answered question. The stamp is minted by the
    /// driver so finishing a quiz stays reproducible in tests.
    NextQuestion { stamp: ResultStamp },
    /// User opened the review of the quiz just finished.
    ResultReviewed,
    /// User opened the review of a history entry (0 = most recent).
    HistoryReviewRequested(usize),
    /// Step forward through the reviewed questions.
    ReviewNext,
    /// Step back through the reviewed questions.
    ReviewPrev,
    /// User left the review screen.
    ReviewClosed,
    /// User picked a theme.
    ThemeSelected(Theme),
    /// User dismissed the error screen.
    ErrorAcknowledged,
}
