//! Domain types shared by the pipeline, the session controller, and the
//! preference store.
//!
//! Everything here serialises with camelCase field names so the preference
//! file on disk and the Gemini response schema describe the same shape —
//! a question parsed from an API response can be persisted into history
//! without any field mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single multiple-choice question.
///
/// Invariant: `correct_answer_index < options.len()`. The parser drops
/// questions that violate it (see [`crate::gemini`]), so every `Question`
/// handed to the session controller is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The question text as it appeared in the document.
    pub question_text: String,
    /// Possible answers, in document order. The response schema asks for 4–5.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_answer_index: usize,
    /// Short explanation of why the correct answer is correct.
    pub reason: String,
}

/// Answers recorded during a quiz: question position → selected option index.
///
/// Sparse — only answered questions are present. Ordered so iteration and
/// serialisation are deterministic.
pub type UserAnswers = BTreeMap<usize, usize>;

/// An immutable snapshot of a completed quiz.
///
/// Created once when the last question is answered and the user advances;
/// appended to history most-recent-first and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Creation timestamp (RFC 3339), doubling as a unique id.
    pub id: String,
    /// Number of correctly answered questions. `score <= total_questions`.
    pub score: usize,
    /// Number of questions in the quiz; equals `questions.len()`.
    pub total_questions: usize,
    /// Human-readable completion date.
    pub date: String,
    /// The questions as presented, so review works after regeneration.
    pub questions: Vec<Question>,
    /// What the user picked for each question.
    pub user_answers: UserAnswers,
}

impl QuizResult {
    /// Score as a whole percentage, rounded. Zero questions → 0.
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_questions as f64) * 100.0).round() as u32
    }
}

/// Identity stamp for a [`QuizResult`], split out so the session reducer can
/// stay a pure function: the driver mints the stamp and passes it in with
/// the advance message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultStamp {
    pub id: String,
    pub date: String,
}

impl ResultStamp {
    /// Stamp for the current instant: RFC 3339 id, local display date.
    pub fn now() -> Self {
        Self {
            id: chrono::Utc::now().to_rfc3339(),
            date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
        }
    }
}

/// Colour theme, persisted as a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Emerald,
    Rose,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Emerald, Theme::Rose];

    /// The next theme in the fixed cycle, wrapping around.
    pub fn next(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Emerald,
            Theme::Emerald => Theme::Rose,
            Theme::Rose => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Emerald => "emerald",
            Theme::Rose => "rose",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            question_text: "What is 2 + 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
            correct_answer_index: 1,
            reason: "Basic arithmetic.".into(),
        }
    }

    #[test]
    fn question_serialises_camel_case() {
        let q = sample_question();
        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("questionText").is_some());
        assert!(json.get("correctAnswerIndex").is_some());
        assert!(json.get("question_text").is_none());
    }

    #[test]
    fn result_serialises_camel_case_with_string_keys() {
        let mut answers = UserAnswers::new();
        answers.insert(0, 1);
        answers.insert(2, 3);
        let r = QuizResult {
            id: "2026-01-01T00:00:00Z".into(),
            score: 1,
            total_questions: 3,
            date: "1/1/2026".into(),
            questions: vec![sample_question()],
            user_answers: answers,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("totalQuestions").is_some());
        let ua = json.get("userAnswers").unwrap();
        assert_eq!(ua.get("0").and_then(|v| v.as_u64()), Some(1));
        assert_eq!(ua.get("2").and_then(|v| v.as_u64()), Some(3));

        let back: QuizResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn percentage_rounds() {
        let mut r = QuizResult {
            id: String::new(),
            score: 2,
            total_questions: 3,
            date: String::new(),
            questions: vec![],
            user_answers: UserAnswers::new(),
        };
        assert_eq!(r.percentage(), 67);
        r.score = 0;
        assert_eq!(r.percentage(), 0);
        r.score = 3;
        assert_eq!(r.percentage(), 100);
        r.total_questions = 0;
        assert_eq!(r.percentage(), 0);
    }

    #[test]
    fn theme_cycle_visits_all() {
        let mut t = Theme::Dark;
        let mut seen = Vec::new();
        for _ in 0..Theme::ALL.len() {
            seen.push(t);
            t = t.next();
        }
        assert_eq!(t, Theme::Dark);
        assert_eq!(seen, Theme::ALL);
    }

    #[test]
    fn theme_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Emerald).unwrap(), "\"emerald\"");
        let t: Theme = serde_json::from_str("\"rose\"").unwrap();
        assert_eq!(t, Theme::Rose);
    }
}
