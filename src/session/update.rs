use crate::model::QuizResult;
use crate::progress::ProcessingProgress;
use crate::session::effect::Effect;
use crate::session::msg::Msg;
use crate::session::state::{ActiveQuiz, AppState, ReviewSession, View};

/// Error-screen message for a run that produced zero questions.
pub const EMPTY_QUIZ_MESSAGE: &str = "The AI couldn't generate a quiz from the document. \
     It might be low quality, image-based, or not contain clear questions.";

/// Pure update function: applies a message to state and returns any effects.
///
/// Every transition the application makes goes through here. Pipeline
/// messages are guarded by the view they belong to, so a stale event from
/// an abandoned run cannot corrupt a later one.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        // ── Identity and credential ────────────────────────────────────
        Msg::LoginSubmitted(raw) => {
            if state.view != View::Login {
                return (state, Vec::new());
            }
            let name = raw.trim();
            if name.is_empty() {
                return (state, Vec::new());
            }
            state.user = Some(name.to_string());
            state.view = state.landing_view();
            vec![Effect::SaveUser(state.user.clone())]
        }
        Msg::LoggedOut => {
            state.user = None;
            state.clear_quiz_state();
            state.view = state.landing_view();
            vec![Effect::SaveUser(None)]
        }
        Msg::ApiKeySubmitted(raw) => {
            if state.view != View::ApiKeySetup {
                return (state, Vec::new());
            }
            let key = raw.trim();
            if key.is_empty() {
                return (state, Vec::new());
            }
            state.api_key = Some(key.to_string());
            state.view = state.landing_view();
            vec![Effect::SaveApiKey(state.api_key.clone())]
        }
        Msg::ApiKeyCleared => {
            state.api_key = None;
            state.view = state.landing_view();
            vec![Effect::SaveApiKey(None)]
        }

        // ── Navigation ─────────────────────────────────────────────────
        Msg::NewQuizRequested => {
            if !matches!(state.view, View::Dashboard | View::Results) {
                return (state, Vec::new());
            }
            state.clear_quiz_state();
            state.view = View::Upload;
            Vec::new()
        }
        Msg::DashboardRequested => {
            // Navigation is locked while a pipeline run is in flight.
            if matches!(state.view, View::Processing | View::Generating) {
                return (state, Vec::new());
            }
            state.clear_quiz_state();
            state.view = state.landing_view();
            Vec::new()
        }

        // ── Pipeline ───────────────────────────────────────────────────
        Msg::FileChosen(path) => {
            if state.view != View::Upload {
                return (state, Vec::new());
            }
            state.view = View::Processing;
            state.processing = ProcessingProgress::default();
            state.generating = ProcessingProgress::default();
            state.upload_error = None;
            vec![Effect::StartPipeline(path)]
        }
        Msg::ExtractionProgress(progress) => {
            if state.view == View::Processing {
                state.processing = progress;
            }
            Vec::new()
        }
        Msg::ExtractionRejected { message } => {
            if state.view != View::Processing {
                return (state, Vec::new());
            }
            state.view = View::Upload;
            state.upload_error = Some(message);
            Vec::new()
        }
        Msg::GenerationStarted { total_chunks } => {
            if state.view != View::Processing {
                return (state, Vec::new());
            }
            state.view = View::Generating;
            state.generating = ProcessingProgress::new(0, total_chunks);
            Vec::new()
        }
        Msg::GenerationProgress(progress) => {
            if state.view == View::Generating {
                state.generating = progress;
            }
            Vec::new()
        }
        Msg::GenerationFinished { questions } => {
            if state.view != View::Generating {
                return (state, Vec::new());
            }
            if questions.is_empty() {
                state.error_message = Some(EMPTY_QUIZ_MESSAGE.to_string());
                state.view = View::Error;
            } else {
                state.active_quiz = Some(ActiveQuiz::new(questions));
                state.view = View::Quiz;
            }
            Vec::new()
        }
        Msg::PipelineFailed { message } => {
            if !matches!(state.view, View::Processing | View::Generating) {
                return (state, Vec::new());
            }
            state.error_message = Some(message);
            state.view = View::Error;
            Vec::new()
        }

        // ── Taking a quiz ──────────────────────────────────────────────
        Msg::AnswerSelected(option_index) => {
            if state.view != View::Quiz {
                return (state, Vec::new());
            }
            let Some(quiz) = state.active_quiz.as_mut() else {
                return (state, Vec::new());
            };
            // First pick wins; later picks on the same question are no-ops.
            if quiz.selected.is_some() {
                return (state, Vec::new());
            }
            let Some(question) = quiz.current_question() else {
                return (state, Vec::new());
            };
            if option_index >= question.options.len() {
                return (state, Vec::new());
            }
            let correct = option_index == question.correct_answer_index;

            quiz.selected = Some(option_index);
            quiz.answers.insert(quiz.current_index, option_index);
            if correct {
                quiz.score += 1;
            }
            Vec::new()
        }
        Msg::NextQuestion { stamp } => {
            if state.view != View::Quiz {
                return (state, Vec::new());
            }
            let Some(quiz) = state.active_quiz.as_mut() else {
                return (state, Vec::new());
            };
            if quiz.selected.is_none() {
                return (state, Vec::new());
            }
            if !quiz.is_last_question() {
                quiz.current_index += 1;
                quiz.selected = None;
                return (state, Vec::new());
            }

            // Last question answered: snapshot the run and land on results.
            let finished = match state.active_quiz.take() {
                Some(q) => q,
                None => return (state, Vec::new()),
            };
            let result = QuizResult {
                id: stamp.id,
                score: finished.score,
                total_questions: finished.questions.len(),
                date: stamp.date,
                questions: finished.questions,
                user_answers: finished.answers,
            };
            state.history.insert(0, result.clone());
            state.active_result = Some(result);
            state.view = View::Results;
            vec![Effect::SaveHistory(state.history.clone())]
        }

        // ── Reviewing ──────────────────────────────────────────────────
        Msg::ResultReviewed => {
            if state.view != View::Results {
                return (state, Vec::new());
            }
            let Some(result) = state.active_result.clone() else {
                return (state, Vec::new());
            };
            state.reviewing = Some(ReviewSession {
                result,
                index: 0,
                return_view: View::Results,
            });
            state.view = View::Review;
            Vec::new()
        }
        Msg::HistoryReviewRequested(history_index) => {
            if state.view != View::Dashboard {
                return (state, Vec::new());
            }
            let Some(result) = state.history.get(history_index).cloned() else {
                return (state, Vec::new());
            };
            state.reviewing = Some(ReviewSession {
                result,
                index: 0,
                return_view: View::Dashboard,
            });
            state.view = View::Review;
            Vec::new()
        }
        Msg::ReviewNext => {
            if let Some(review) = state.reviewing.as_mut() {
                let last = review.result.questions.len().saturating_sub(1);
                review.index = (review.index + 1).min(last);
            }
            Vec::new()
        }
        Msg::ReviewPrev => {
            if let Some(review) = state.reviewing.as_mut() {
                review.index = review.index.saturating_sub(1);
            }
            Vec::new()
        }
        Msg::ReviewClosed => {
            if let Some(review) = state.reviewing.take() {
                state.view = review.return_view;
            }
            Vec::new()
        }

        // ── Theme and errors ───────────────────────────────────────────
        Msg::ThemeSelected(theme) => {
            if state.theme == theme {
                return (state, Vec::new());
            }
            state.theme = theme;
            vec![Effect::SaveTheme(theme)]
        }
        Msg::ErrorAcknowledged => {
            if state.view != View::Error {
                return (state, Vec::new());
            }
            state.error_message = None;
            // With identity and credential intact the retry path is a new
            // upload; a missing one routes to the screen that restores it.
            state.view = match state.landing_view() {
                View::Dashboard => View::Upload,
                other => other,
            };
            Vec::new()
        }
    };

    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, ResultStamp, Theme};

    fn sample_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                question_text: format!("Question {i}?"),
                options: vec![
                    "alpha".to_string(),
                    "beta".to_string(),
                    "gamma".to_string(),
                    "delta".to_string(),
                ],
                correct_answer_index: i % 4,
                reason: format!("Because {i}."),
            })
            .collect()
    }

    fn dashboard_state() -> AppState {
        AppState::new(
            Some("sam".to_string()),
            Some("key-123".to_string()),
            Vec::new(),
            Theme::Dark,
        )
    }

    fn quiz_state(n: usize) -> AppState {
        let mut state = dashboard_state();
        state.view = View::Quiz;
        state.active_quiz = Some(ActiveQuiz::new(sample_questions(n)));
        state
    }

    fn stamp() -> ResultStamp {
        ResultStamp {
            id: "2024-05-01T10:00:00Z".to_string(),
            date: "5/1/2024".to_string(),
        }
    }

    #[test]
    fn login_then_key_setup_reaches_dashboard() {
        let state = AppState::new(None, None, Vec::new(), Theme::Dark);

        let (state, effects) = update(state, Msg::LoginSubmitted("  sam  ".to_string()));
        assert_eq!(state.view, View::ApiKeySetup);
        assert_eq!(effects, vec![Effect::SaveUser(Some("sam".to_string()))]);

        let (state, effects) = update(state, Msg::ApiKeySubmitted("key-123".to_string()));
        assert_eq!(state.view, View::Dashboard);
        assert_eq!(effects, vec![Effect::SaveApiKey(Some("key-123".to_string()))]);
    }

    #[test]
    fn blank_login_is_ignored() {
        let state = AppState::new(None, None, Vec::new(), Theme::Dark);
        let (state, effects) = update(state, Msg::LoginSubmitted("   ".to_string()));
        assert_eq!(state.view, View::Login);
        assert!(state.user.is_none());
        assert!(effects.is_empty());
    }

    #[test]
    fn file_chosen_resets_progress_and_starts_pipeline() {
        let (state, _) = update(dashboard_state(), Msg::NewQuizRequested);
        assert_eq!(state.view, View::Upload);

        let path = std::path::PathBuf::from("exam.pdf");
        let (state, effects) = update(state, Msg::FileChosen(path.clone()));
        assert_eq!(state.view, View::Processing);
        assert_eq!(state.processing, ProcessingProgress::default());
        assert_eq!(effects, vec![Effect::StartPipeline(path)]);
    }

    #[test]
    fn input_rejection_returns_inline_to_upload() {
        let mut state = dashboard_state();
        state.view = View::Processing;

        let (state, effects) = update(
            state,
            Msg::ExtractionRejected {
                message: "Unsupported file type".to_string(),
            },
        );
        assert_eq!(state.view, View::Upload);
        assert_eq!(state.upload_error.as_deref(), Some("Unsupported file type"));
        assert!(effects.is_empty());
    }

    #[test]
    fn generation_started_moves_processing_to_generating() {
        let mut state = dashboard_state();
        state.view = View::Processing;

        let (state, _) = update(state, Msg::GenerationStarted { total_chunks: 3 });
        assert_eq!(state.view, View::Generating);
        assert_eq!(state.generating, ProcessingProgress::new(0, 3));
    }

    #[test]
    fn empty_generation_is_a_content_quality_error() {
        let mut state = dashboard_state();
        state.view = View::Generating;

        let (state, _) = update(
            state,
            Msg::GenerationFinished {
                questions: Vec::new(),
            },
        );
        assert_eq!(state.view, View::Error);
        assert_eq!(state.error_message.as_deref(), Some(EMPTY_QUIZ_MESSAGE));
    }

    #[test]
    fn nonempty_generation_enters_a_fresh_quiz() {
        let mut state = dashboard_state();
        state.view = View::Generating;

        let (state, _) = update(
            state,
            Msg::GenerationFinished {
                questions: sample_questions(3),
            },
        );
        assert_eq!(state.view, View::Quiz);
        let quiz = state.active_quiz.unwrap();
        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.current_index, 0);
        assert_eq!(quiz.score, 0);
        assert!(quiz.answers.is_empty());
    }

    #[test]
    fn answer_selection_is_idempotent() {
        // Question 0's correct option is index 0.
        let state = quiz_state(2);

        let (state, _) = update(state, Msg::AnswerSelected(0));
        let quiz = state.active_quiz.as_ref().unwrap();
        assert_eq!(quiz.score, 1);
        assert_eq!(quiz.answers.get(&0), Some(&0));

        // A second pick with a different index changes nothing.
        let (state, _) = update(state, Msg::AnswerSelected(1));
        let quiz = state.active_quiz.as_ref().unwrap();
        assert_eq!(quiz.score, 1);
        assert_eq!(quiz.answers.get(&0), Some(&0));
        assert_eq!(quiz.selected, Some(0));
    }

    #[test]
    fn wrong_answer_records_without_scoring() {
        let state = quiz_state(2);
        let (state, _) = update(state, Msg::AnswerSelected(3));
        let quiz = state.active_quiz.as_ref().unwrap();
        assert_eq!(quiz.score, 0);
        assert_eq!(quiz.answers.get(&0), Some(&3));
    }

    #[test]
    fn out_of_range_answer_is_ignored() {
        let state = quiz_state(1);
        let (state, _) = update(state, Msg::AnswerSelected(9));
        let quiz = state.active_quiz.as_ref().unwrap();
        assert!(quiz.selected.is_none());
        assert!(quiz.answers.is_empty());
    }

    #[test]
    fn advancing_requires_a_selection() {
        let state = quiz_state(2);
        let (state, effects) = update(state, Msg::NextQuestion { stamp: stamp() });
        assert_eq!(state.view, View::Quiz);
        assert_eq!(state.active_quiz.as_ref().unwrap().current_index, 0);
        assert!(effects.is_empty());
    }

    #[test]
    fn finishing_snapshots_the_run_at_the_head_of_history() {
        // Two questions; answer q0 correctly, q1 wrongly.
        let state = quiz_state(2);
        let (state, _) = update(state, Msg::AnswerSelected(0));
        let (state, _) = update(state, Msg::NextQuestion { stamp: stamp() });
        assert_eq!(state.active_quiz.as_ref().unwrap().current_index, 1);
        assert!(state.active_quiz.as_ref().unwrap().selected.is_none());

        let (state, _) = update(state, Msg::AnswerSelected(3));
        let (state, effects) = update(state, Msg::NextQuestion { stamp: stamp() });

        assert_eq!(state.view, View::Results);
        assert!(state.active_quiz.is_none());
        assert_eq!(state.history.len(), 1);

        let result = &state.history[0];
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.user_answers.len(), 2);
        assert_eq!(result.user_answers.get(&0), Some(&0));
        assert_eq!(result.user_answers.get(&1), Some(&3));
        assert_eq!(state.active_result.as_ref(), Some(result));
        assert_eq!(effects, vec![Effect::SaveHistory(state.history.clone())]);
    }

    #[test]
    fn review_navigation_clamps_at_both_ends() {
        let state = quiz_state(2);
        let (state, _) = update(state, Msg::AnswerSelected(0));
        let (state, _) = update(state, Msg::NextQuestion { stamp: stamp() });
        let (state, _) = update(state, Msg::AnswerSelected(1));
        let (state, _) = update(state, Msg::NextQuestion { stamp: stamp() });

        let (state, _) = update(state, Msg::ResultReviewed);
        assert_eq!(state.view, View::Review);
        assert_eq!(state.reviewing.as_ref().unwrap().index, 0);

        let (state, _) = update(state, Msg::ReviewPrev);
        assert_eq!(state.reviewing.as_ref().unwrap().index, 0);

        let (state, _) = update(state, Msg::ReviewNext);
        let (state, _) = update(state, Msg::ReviewNext);
        let (state, _) = update(state, Msg::ReviewNext);
        assert_eq!(state.reviewing.as_ref().unwrap().index, 1);

        let (state, _) = update(state, Msg::ReviewClosed);
        assert_eq!(state.view, View::Results);
        assert!(state.reviewing.is_none());
    }

    #[test]
    fn history_review_opens_from_dashboard_and_returns_there() {
        let mut state = dashboard_state();
        state.history = vec![QuizResult {
            id: "2024-04-01T09:00:00Z".to_string(),
            score: 3,
            total_questions: 4,
            date: "4/1/2024".to_string(),
            questions: sample_questions(4),
            user_answers: [(0, 0), (1, 1), (2, 2), (3, 0)].into_iter().collect(),
        }];

        let (state, _) = update(state, Msg::HistoryReviewRequested(0));
        assert_eq!(state.view, View::Review);
        assert_eq!(
            state.reviewing.as_ref().unwrap().return_view,
            View::Dashboard
        );

        let (state, _) = update(state, Msg::ReviewClosed);
        assert_eq!(state.view, View::Dashboard);
    }

    #[test]
    fn history_review_with_bad_index_is_ignored() {
        let state = dashboard_state();
        let (state, _) = update(state, Msg::HistoryReviewRequested(7));
        assert_eq!(state.view, View::Dashboard);
        assert!(state.reviewing.is_none());
    }

    #[test]
    fn logout_keeps_history_and_theme() {
        let mut state = dashboard_state();
        state.theme = Theme::Emerald;
        state.history = vec![QuizResult {
            id: "2024-04-01T09:00:00Z".to_string(),
            score: 1,
            total_questions: 1,
            date: "4/1/2024".to_string(),
            questions: sample_questions(1),
            user_answers: std::iter::once((0, 0)).collect(),
        }];

        let (state, effects) = update(state, Msg::LoggedOut);
        assert_eq!(state.view, View::Login);
        assert!(state.user.is_none());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.theme, Theme::Emerald);
        assert_eq!(effects, vec![Effect::SaveUser(None)]);
    }

    #[test]
    fn pipeline_failure_reaches_the_error_screen() {
        let mut state = dashboard_state();
        state.view = View::Generating;

        let (state, _) = update(
            state,
            Msg::PipelineFailed {
                message: "Failed to generate quiz from text due to an API error.".to_string(),
            },
        );
        assert_eq!(state.view, View::Error);
        assert!(state.error_message.is_some());
    }

    #[test]
    fn error_acknowledged_routes_by_what_is_still_valid() {
        let mut state = dashboard_state();
        state.view = View::Error;
        state.error_message = Some("boom".to_string());
        let (state, _) = update(state, Msg::ErrorAcknowledged);
        assert_eq!(state.view, View::Upload);
        assert!(state.error_message.is_none());

        let mut state = dashboard_state();
        state.api_key = None;
        state.view = View::Error;
        let (state, _) = update(state, Msg::ErrorAcknowledged);
        assert_eq!(state.view, View::ApiKeySetup);
    }

    #[test]
    fn stale_pipeline_events_are_dropped() {
        // A rejection arriving after the user already landed elsewhere
        // must not fling them back to the upload screen.
        let state = dashboard_state();
        let (state, _) = update(
            state,
            Msg::ExtractionRejected {
                message: "late".to_string(),
            },
        );
        assert_eq!(state.view, View::Dashboard);
        assert!(state.upload_error.is_none());

        let (state, _) = update(
            state,
            Msg::GenerationFinished {
                questions: sample_questions(2),
            },
        );
        assert_eq!(state.view, View::Dashboard);
        assert!(state.active_quiz.is_none());
    }

    #[test]
    fn theme_selection_emits_a_save() {
        let state = dashboard_state();
        let (state, effects) = update(state, Msg::ThemeSelected(Theme::Rose));
        assert_eq!(state.theme, Theme::Rose);
        assert_eq!(effects, vec![Effect::SaveTheme(Theme::Rose)]);

        // Re-selecting the active theme writes nothing.
        let (_, effects) = update(state, Msg::ThemeSelected(Theme::Rose));
        assert!(effects.is_empty());
    }
}
