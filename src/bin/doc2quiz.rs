//! Terminal front end for doc2quiz.
//!
//! A thin driver around the library: it renders the current [`View`],
//! turns keystrokes and pipeline callbacks into [`Msg`]s, feeds them to
//! the pure [`update`] function, and executes the [`Effect`]s that come
//! back (preference writes and pipeline runs).

use anyhow::{Context, Result};
use clap::Parser;
use doc2quiz::{
    generate_quiz, update, AppState, Effect, GenerationConfig, InMemoryStore, JsonPreferenceStore,
    Msg, PreferenceStore, ProcessingProgress, ProgressCallback, QuizProgressCallback, ResultStamp,
    Theme, View,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Theme accent colour, applied to screen headers.
fn accent(theme: Theme, s: &str) -> String {
    let code = match theme {
        Theme::Dark => "\x1b[36m",
        Theme::Light => "\x1b[34m",
        Theme::Emerald => "\x1b[32m",
        Theme::Rose => "\x1b[35m",
    };
    format!("{code}{s}\x1b[0m")
}

fn coloured_percentage(percentage: u32) -> String {
    let text = format!("{percentage}%");
    if percentage >= 80 {
        green(&text)
    } else if percentage >= 50 {
        yellow(&text)
    } else {
        red(&text)
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: renders a live bar for page extraction and
/// chunked generation, and forwards every event to the session loop as a
/// [`Msg`] so the reducer sees the same progress the user does.
struct CliProgressCallback {
    /// `None` when progress output is disabled.
    bar: Option<ProgressBar>,
    tx: Sender<Msg>,
}

impl CliProgressCallback {
    fn new(tx: Sender<Msg>, show_progress: bool) -> Self {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            let spinner_style =
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICK_STRINGS);
            bar.set_style(spinner_style);
            bar.set_prefix("Reading");
            bar.set_message("Opening document…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Self { bar, tx }
    }

    /// Switch to the counting bar style once a total is known.
    fn activate_bar(&self, prefix: &'static str, unit: &'static str, total: usize) {
        let Some(ref bar) = self.bar else { return };
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  ⏱ {{elapsed_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICK_STRINGS);

        bar.set_length(total as u64);
        bar.set_position(0);
        bar.set_style(style);
        bar.set_prefix(prefix);
    }

    /// Fall back to a spinner for work with no meaningful total.
    fn spin(&self, prefix: &'static str, message: &'static str) {
        let Some(ref bar) = self.bar else { return };
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICK_STRINGS);
        bar.set_style(style);
        bar.set_prefix(prefix);
        bar.set_message(message);
    }

    fn send(&self, msg: Msg) {
        self.tx.send(msg).ok();
    }
}

impl QuizProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar("Extracting", "pages", total_pages);
        self.send(Msg::ExtractionProgress(ProcessingProgress::new(
            0,
            total_pages,
        )));
    }

    fn on_page_extracted(&self, page_num: usize, total_pages: usize) {
        if let Some(ref bar) = self.bar {
            bar.set_position(page_num as u64);
        }
        self.send(Msg::ExtractionProgress(ProcessingProgress::new(
            page_num,
            total_pages,
        )));
    }

    fn on_image_fallback(&self, total_pages: usize) {
        if let Some(ref bar) = self.bar {
            bar.println(format!(
                "  {} Thin text layer; rendering {total_pages} pages as images",
                cyan("◆")
            ));
        }
        self.activate_bar("Rendering", "pages", total_pages);
        self.send(Msg::ExtractionProgress(ProcessingProgress::new(
            0,
            total_pages,
        )));
    }

    fn on_extraction_complete(&self, _total_pages: usize) {
        self.spin("Generating", "Preparing questions…");
    }

    fn on_generation_start(&self, total_chunks: usize) {
        if total_chunks == 0 {
            // Single text request: no chunk count to show.
            self.spin("Generating", "Analyzing your document and building the quiz...");
        } else {
            self.activate_bar("Generating", "chunks", total_chunks);
        }
        self.send(Msg::GenerationStarted { total_chunks });
    }

    fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize) {
        if let Some(ref bar) = self.bar {
            bar.set_position(chunk_num as u64);
            bar.println(format!(
                "  {} Analyzing chunk {chunk_num}/{total_chunks}",
                green("✓")
            ));
        }
        self.send(Msg::GenerationProgress(ProcessingProgress::new(
            chunk_num,
            total_chunks,
        )));
    }

    fn on_generation_complete(&self, question_count: usize) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
            eprintln!(
                "{} {} questions extracted",
                green("✔"),
                bold(&question_count.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session
  doc2quiz

  # Quiz a document right away
  doc2quiz exam.pdf

  # Use a different Gemini model
  doc2quiz --model gemini-2.5-pro notes.png

  # Keep preferences somewhere else
  doc2quiz --state-dir ~/quizzes exam.pdf

  # Throwaway session, nothing written to disk
  doc2quiz --ephemeral exam.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Used when no key is stored yet
  DOC2QUIZ_MODEL       Override the Gemini model ID
  DOC2QUIZ_STATE_DIR   Override the preference directory
  RUST_LOG             Tracing filter (overrides --verbose)

SETUP:
  1. Get a Gemini API key: https://aistudio.google.com/apikey
  2. Run doc2quiz and paste the key when asked — it is stored for next
     time. Exporting GEMINI_API_KEY works too.

STORAGE:
  Preferences (name, API key, quiz history, theme) live in
  ~/.config/doc2quiz/preferences.json (or the platform equivalent).
  Delete the file to reset everything.
"#;

/// Generate interactive quizzes from documents using Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "doc2quiz",
    version,
    about = "Turn PDFs and images into interactive multiple-choice quizzes",
    long_about = "Upload a question paper, worksheet, or any document as a PDF or image; \
Gemini extracts the multiple-choice questions it contains and doc2quiz runs them as an \
interactive quiz with scoring, history, and per-question review.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to quiz on right away (PDF or image); skips the upload prompt.
    file: Option<PathBuf>,

    /// Gemini model ID.
    #[arg(long, env = "DOC2QUIZ_MODEL")]
    model: Option<String>,

    /// Directory holding preferences.json (defaults to the platform config dir).
    #[arg(long, env = "DOC2QUIZ_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Run without reading or writing stored preferences.
    #[arg(long)]
    ephemeral: bool,

    /// Max page images per generation request.
    #[arg(long, env = "DOC2QUIZ_CHUNK_SIZE", default_value_t = 4)]
    chunk_size: usize,

    /// API call timeout in seconds.
    #[arg(long, env = "DOC2QUIZ_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable progress bars.
    #[arg(long, env = "DOC2QUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2QUIZ_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The screens are the interface; library logs stay out of the way
    // unless explicitly asked for.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Preference store ─────────────────────────────────────────────────
    let mut store: Box<dyn PreferenceStore> = if cli.ephemeral {
        Box::new(InMemoryStore::new())
    } else {
        let path = match cli.state_dir {
            Some(ref dir) => dir.join("preferences.json"),
            None => JsonPreferenceStore::default_path()
                .context("No config directory available; use --state-dir or --ephemeral")?,
        };
        Box::new(JsonPreferenceStore::open(path))
    };

    // ── Generation settings ──────────────────────────────────────────────
    let mut builder = GenerationConfig::builder()
        .chunk_size(cli.chunk_size)
        .api_timeout_secs(cli.api_timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    let base_config = builder.build().context("Invalid configuration")?;

    // A key from the environment fills in for a missing stored one, so a
    // first run with GEMINI_API_KEY exported skips the setup screen.
    let env_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let stored_key = store.api_key().or(env_key);

    let mut state = AppState::new(store.user(), stored_key, store.history(), store.theme());
    let mut pending_file = cli.file.clone();
    let show_progress = !cli.no_progress;

    let (tx, rx) = mpsc::channel::<Msg>();

    // ── Session loop ─────────────────────────────────────────────────────
    loop {
        let msg = match state.view {
            View::Login => {
                render_login(state.theme);
                match prompt("Your name:") {
                    None => break,
                    Some(name) if name.is_empty() => continue,
                    Some(name) => Msg::LoginSubmitted(name),
                }
            }
            View::ApiKeySetup => {
                render_api_key_setup(&state);
                match prompt("Gemini API key:") {
                    None => break,
                    Some(input) if input == "logout" => Msg::LoggedOut,
                    Some(input) if input.is_empty() => continue,
                    Some(input) => Msg::ApiKeySubmitted(input),
                }
            }
            View::Dashboard => {
                if pending_file.is_some() {
                    // A file on the command line goes straight to upload.
                    Msg::NewQuizRequested
                } else {
                    render_dashboard(&state);
                    match prompt("›") {
                        None => break,
                        Some(input) => match input.as_str() {
                            "n" => Msg::NewQuizRequested,
                            "t" => Msg::ThemeSelected(state.theme.next()),
                            "k" => Msg::ApiKeyCleared,
                            "l" => Msg::LoggedOut,
                            "q" => break,
                            other => match other.parse::<usize>() {
                                Ok(i) if i >= 1 => Msg::HistoryReviewRequested(i - 1),
                                _ => continue,
                            },
                        },
                    }
                }
            }
            View::Upload => {
                if let Some(path) = pending_file.take() {
                    Msg::FileChosen(path)
                } else {
                    render_upload(&state);
                    match prompt("Document path:") {
                        None => break,
                        Some(input) if input == "b" => Msg::DashboardRequested,
                        Some(input) if input.is_empty() => continue,
                        Some(input) => Msg::FileChosen(PathBuf::from(input)),
                    }
                }
            }
            View::Processing | View::Generating => {
                // The pipeline resolves inside the FileChosen effect and its
                // final message lands before the loop comes back around.
                Msg::PipelineFailed {
                    message: "The quiz pipeline stopped unexpectedly.".to_string(),
                }
            }
            View::Quiz => {
                render_quiz(&state);
                let answered = state
                    .active_quiz
                    .as_ref()
                    .is_some_and(|quiz| quiz.selected.is_some());
                if answered {
                    match read_line_trimmed() {
                        None => break,
                        Some(_) => Msg::NextQuestion {
                            stamp: ResultStamp::now(),
                        },
                    }
                } else {
                    let option_count = state
                        .active_quiz
                        .as_ref()
                        .and_then(|quiz| quiz.current_question())
                        .map(|q| q.options.len())
                        .unwrap_or(0);
                    match prompt(&format!("Pick an option (1-{option_count}):")) {
                        None => break,
                        Some(input) => match input.parse::<usize>() {
                            Ok(n) if n >= 1 && n <= option_count => Msg::AnswerSelected(n - 1),
                            _ => continue,
                        },
                    }
                }
            }
            View::Results => {
                render_results(&state);
                match prompt("›") {
                    None => break,
                    Some(input) => match input.as_str() {
                        "r" => Msg::ResultReviewed,
                        "n" => Msg::NewQuizRequested,
                        "d" => Msg::DashboardRequested,
                        _ => continue,
                    },
                }
            }
            View::Review => {
                render_review(&state);
                match prompt("›") {
                    None => break,
                    Some(input) => match input.as_str() {
                        "n" | "" => Msg::ReviewNext,
                        "p" => Msg::ReviewPrev,
                        "b" => Msg::ReviewClosed,
                        _ => continue,
                    },
                }
            }
            View::Error => {
                render_error(&state);
                match read_line_trimmed() {
                    None => break,
                    Some(_) => Msg::ErrorAcknowledged,
                }
            }
        };

        let (next, effects) = update(state, msg);
        state = next;
        state = execute_effects(
            state,
            effects,
            store.as_mut(),
            &base_config,
            show_progress,
            &tx,
            &rx,
        )
        .await;
    }

    println!("{}", dim("Bye!"));
    Ok(())
}

// ── Effect execution ─────────────────────────────────────────────────────────

/// Run the effects a reducer step produced. A pipeline run blocks until it
/// finishes, then every message it queued is applied in order.
async fn execute_effects(
    mut state: AppState,
    effects: Vec<Effect>,
    store: &mut dyn PreferenceStore,
    base_config: &GenerationConfig,
    show_progress: bool,
    tx: &Sender<Msg>,
    rx: &Receiver<Msg>,
) -> AppState {
    for effect in effects {
        match effect {
            Effect::StartPipeline(path) => {
                let api_key = state.api_key.clone().unwrap_or_default();
                run_pipeline(&path, &api_key, base_config, show_progress, tx.clone()).await;

                // Apply everything the pipeline reported, in order.
                while let Ok(msg) = rx.try_recv() {
                    let (next, nested) = update(state, msg);
                    state = next;
                    for nested_effect in nested {
                        apply_store_effect(store, nested_effect);
                    }
                }
            }
            other => apply_store_effect(store, other),
        }
    }
    state
}

fn apply_store_effect(store: &mut dyn PreferenceStore, effect: Effect) {
    let outcome = match effect {
        Effect::SaveUser(user) => store.set_user(user),
        Effect::SaveApiKey(key) => store.set_api_key(key),
        Effect::SaveTheme(theme) => store.set_theme(theme),
        Effect::SaveHistory(history) => store.set_history(history),
        Effect::StartPipeline(_) => Ok(()),
    };
    if let Err(e) = outcome {
        eprintln!("{} {e}", yellow("⚠"));
    }
}

/// Run extraction and generation for one document, forwarding progress and
/// the final outcome through the channel.
async fn run_pipeline(
    path: &Path,
    api_key: &str,
    base_config: &GenerationConfig,
    show_progress: bool,
    tx: Sender<Msg>,
) {
    let callback = Arc::new(CliProgressCallback::new(tx.clone(), show_progress));
    let mut config = base_config.clone();
    config.progress_callback = Some(callback as ProgressCallback);

    let msg = match generate_quiz(path, api_key, &config).await {
        Ok(output) => Msg::GenerationFinished {
            questions: output.questions,
        },
        Err(e) if e.is_input_rejection() => Msg::ExtractionRejected {
            message: e.to_string(),
        },
        Err(e) => Msg::PipelineFailed {
            message: e.to_string(),
        },
    };
    tx.send(msg).ok();
}

// ── Screens ──────────────────────────────────────────────────────────────────

fn render_login(theme: Theme) {
    println!();
    println!(
        "{}",
        accent(theme, "━━ doc2quiz ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    println!("{}", bold("Quizzes from your own documents."));
    println!();
}

fn render_api_key_setup(state: &AppState) {
    let name = state.user.as_deref().unwrap_or("there");
    println!();
    println!(
        "{}",
        accent(state.theme, "━━ API key ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    println!("Hi {name}! doc2quiz talks to Gemini with your own API key.");
    println!(
        "{}",
        dim("Get one at https://aistudio.google.com/apikey — it is stored locally, nowhere else.")
    );
    println!("{}", dim("Type 'logout' to switch user."));
    println!();
}

fn render_dashboard(state: &AppState) {
    let name = state.user.as_deref().unwrap_or("there");
    println!();
    println!(
        "{}",
        accent(state.theme, "━━ Dashboard ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    println!("{}", bold(&format!("Welcome back, {name}!")));
    println!();

    if state.history.is_empty() {
        println!("{}", dim("No quizzes yet. Start one from a PDF or an image."));
    } else {
        println!("Recent quizzes:");
        for (i, result) in state.history.iter().take(9).enumerate() {
            println!(
                "  [{}] {}  {}  {}",
                i + 1,
                result.date,
                bold(&format!("{}/{}", result.score, result.total_questions)),
                coloured_percentage(result.percentage()),
            );
        }
    }

    println!();
    println!(
        "{}",
        dim(&format!(
            "[n] new quiz   [1-9] review   [t] theme ({})   [k] change API key   [l] log out   [q] quit",
            state.theme.as_str()
        ))
    );
}

fn render_upload(state: &AppState) {
    println!();
    println!(
        "{}",
        accent(state.theme, "━━ New quiz ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    if let Some(ref message) = state.upload_error {
        println!("{}", red(message));
        println!();
    }
    println!("Point me at a question paper or worksheet: a PDF, or an image");
    println!("(png, jpg, gif, webp).");
    println!();
    println!("{}", dim("[path] start   [b] back to dashboard"));
}

fn render_quiz(state: &AppState) {
    let Some(quiz) = state.active_quiz.as_ref() else {
        return;
    };
    let Some(question) = quiz.current_question() else {
        return;
    };

    println!();
    println!(
        "{}",
        accent(
            state.theme,
            &format!(
                "━━ Question {} of {} ━━━━━━━━━━━━━━━━━━━━━━━━━━━",
                quiz.current_index + 1,
                quiz.questions.len()
            )
        )
    );
    println!("{}", bold(&question.question_text));
    println!();

    for (i, option) in question.options.iter().enumerate() {
        let line = format!("{}. {option}", i + 1);
        match quiz.selected {
            None => println!("  {line}"),
            Some(chosen) => {
                if i == question.correct_answer_index {
                    println!("  {}", green(&format!("✓ {line}")));
                } else if i == chosen {
                    println!("  {}", red(&format!("✗ {line}")));
                } else {
                    println!("  {}", dim(&line));
                }
            }
        }
    }

    if quiz.selected.is_some() && !question.reason.is_empty() {
        println!();
        println!("  {}", dim(&format!("Explanation: {}", question.reason)));
    }

    println!();
    if quiz.selected.is_none() {
        println!("{}", dim(&format!("Score so far: {}", quiz.score)));
    } else if quiz.is_last_question() {
        println!("{}", dim("[enter] Finish Quiz"));
    } else {
        println!("{}", dim("[enter] Next Question"));
    }
}

fn render_results(state: &AppState) {
    let Some(result) = state.active_result.as_ref() else {
        return;
    };
    println!();
    println!(
        "{}",
        accent(state.theme, "━━ Quiz complete! ━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    );
    println!(
        "{}  {}",
        bold(&format!(
            "You scored {}/{}",
            result.score, result.total_questions
        )),
        coloured_percentage(result.percentage()),
    );
    println!();
    println!(
        "{}",
        dim("[r] review answers   [n] take another quiz   [d] dashboard")
    );
}

fn render_review(state: &AppState) {
    let Some(review) = state.reviewing.as_ref() else {
        return;
    };
    let total = review.result.questions.len();
    let Some(question) = review.result.questions.get(review.index) else {
        return;
    };

    println!();
    println!(
        "{}",
        accent(
            state.theme,
            &format!(
                "━━ Review {} — question {} of {total} ━━━━━━━━━━━━",
                review.result.date,
                review.index + 1
            )
        )
    );
    println!("{}", bold(&question.question_text));
    println!();

    let user_choice = review.result.user_answers.get(&review.index).copied();
    for (i, option) in question.options.iter().enumerate() {
        let line = format!("{}. {option}", i + 1);
        if i == question.correct_answer_index {
            println!("  {}", green(&format!("✓ {line}")));
        } else if Some(i) == user_choice {
            println!("  {}", red(&format!("✗ {line}  (your answer)")));
        } else {
            println!("  {}", dim(&line));
        }
    }

    if user_choice.is_none() {
        println!();
        println!("  {}", yellow("Not answered."));
    }

    if !question.reason.is_empty() {
        println!();
        println!("  {}", dim(&format!("Explanation: {}", question.reason)));
    }

    println!();
    println!("{}", dim("[n] next   [p] previous   [b] back"));
}

fn render_error(state: &AppState) {
    println!();
    println!("{}", red("━━ Something went wrong ━━━━━━━━━━━━━━━━━━━━━━"));
    if let Some(ref message) = state.error_message {
        println!("{message}");
    }
    println!();
    println!("{}", dim("[enter] Try Again"));
}

// ── Input helpers ────────────────────────────────────────────────────────────

/// Print a prompt and read one trimmed line. `None` means EOF (quit).
fn prompt(label: &str) -> Option<String> {
    print!("{} ", bold(label));
    io::stdout().flush().ok();
    read_line_trimmed()
}

fn read_line_trimmed() -> Option<String> {
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(_) => None,
    }
}
