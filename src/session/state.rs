use crate::model::{Question, QuizResult, Theme, UserAnswers};
use crate::progress::ProcessingProgress;

/// Screens of the application. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    ApiKeySetup,
    Dashboard,
    Upload,
    Processing,
    Generating,
    Quiz,
    Results,
    Review,
    Error,
}

/// Live state of the quiz currently being taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuiz {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: usize,
    pub answers: UserAnswers,
    /// Option picked on the current question, `None` until the first pick.
    /// Further picks on the same question are ignored while this is set.
    pub selected: Option<usize>,
}

impl ActiveQuiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current_index: 0,
            score: 0,
            answers: UserAnswers::new(),
            selected: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }
}

/// A finished quiz being stepped through question by question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    pub result: QuizResult,
    pub index: usize,
    /// Where closing the review returns to: `Results` for the quiz just
    /// taken, `Dashboard` for a history entry.
    pub return_view: View,
}

/// The whole application state. `update` is the only mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub user: Option<String>,
    pub api_key: Option<String>,
    /// Finished quizzes, most recent first.
    pub history: Vec<QuizResult>,
    pub theme: Theme,
    pub view: View,
    pub active_quiz: Option<ActiveQuiz>,
    /// Snapshot of the quiz just finished, backing the results screen.
    pub active_result: Option<QuizResult>,
    pub reviewing: Option<ReviewSession>,
    /// Page extraction progress while `view == Processing`.
    pub processing: ProcessingProgress,
    /// Chunk progress while `view == Generating`; `{0,0}` means
    /// indeterminate (the single-request text path).
    pub generating: ProcessingProgress,
    /// Inline message shown on the upload screen after an input rejection.
    pub upload_error: Option<String>,
    /// Message backing the error screen.
    pub error_message: Option<String>,
}

impl AppState {
    /// Build the state restored preferences land in, enforcing the landing
    /// rule: no identity means login, no credential means key setup,
    /// otherwise the dashboard.
    pub fn new(
        user: Option<String>,
        api_key: Option<String>,
        history: Vec<QuizResult>,
        theme: Theme,
    ) -> Self {
        let mut state = Self {
            user,
            api_key,
            history,
            theme,
            view: View::Login,
            active_quiz: None,
            active_result: None,
            reviewing: None,
            processing: ProcessingProgress::default(),
            generating: ProcessingProgress::default(),
            upload_error: None,
            error_message: None,
        };
        state.view = state.landing_view();
        state
    }

    /// The screen identity and credential presence force.
    pub fn landing_view(&self) -> View {
        match (&self.user, &self.api_key) {
            (None, _) => View::Login,
            (Some(_), None) => View::ApiKeySetup,
            (Some(_), Some(_)) => View::Dashboard,
        }
    }

    /// Drop everything tied to an in-flight or finished quiz run.
    pub(crate) fn clear_quiz_state(&mut self) {
        self.active_quiz = None;
        self.active_result = None;
        self.reviewing = None;
        self.processing = ProcessingProgress::default();
        self.generating = ProcessingProgress::default();
        self.upload_error = None;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_rule_orders_login_key_dashboard() {
        let s = AppState::new(None, None, Vec::new(), Theme::Dark);
        assert_eq!(s.view, View::Login);

        let s = AppState::new(Some("sam".into()), None, Vec::new(), Theme::Dark);
        assert_eq!(s.view, View::ApiKeySetup);

        let s = AppState::new(
            Some("sam".into()),
            Some("key-123".into()),
            Vec::new(),
            Theme::Dark,
        );
        assert_eq!(s.view, View::Dashboard);
    }

    #[test]
    fn missing_identity_wins_over_present_credential() {
        let s = AppState::new(None, Some("key-123".into()), Vec::new(), Theme::Dark);
        assert_eq!(s.view, View::Login);
    }
}
