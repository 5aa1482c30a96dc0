//! Narrow client for the Gemini `generateContent` REST endpoint.
//!
//! One endpoint, two request flavours (a text part, or inline JPEG parts
//! followed by a text part), one response shape. The request asks for a
//! JSON reply constrained by [`RESPONSE_SCHEMA`], so the happy path is
//! "deserialize the envelope"; the unhappy paths split cleanly into
//! transport problems (surfaced as errors) and malformed model output
//! (degraded to an empty question list).
//!
//! ## Why degrade instead of fail on bad model output?
//!
//! A schema-constrained model occasionally still wraps its reply in a code
//! fence or emits truncated JSON. Neither means the user's key or network
//! is broken, so treating it as an API failure would send the user down the
//! wrong debugging path. An empty list reads as "nothing extractable here",
//! which is the honest answer.

use crate::config::GenerationConfig;
use crate::error::Doc2QuizError;
use crate::model::Question;
use crate::pipeline::encode::ImageData;
use crate::prompts::{self, RESPONSE_SCHEMA};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

// ── Client ──────────────────────────────────────────────────────────────

/// Minimal Gemini client carrying the handful of knobs a request needs.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: Option<usize>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl GeminiClient {
    /// Build a client from an API key and the generation settings.
    pub fn new(
        api_key: impl Into<String>,
        config: &GenerationConfig,
    ) -> Result<Self, Doc2QuizError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Doc2QuizError::InvalidConfig(
                "API key must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| Doc2QuizError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Ask for quiz questions from a block of extracted text.
    pub async fn generate_from_text(&self, text: &str) -> Result<Vec<Question>, Doc2QuizError> {
        let parts = vec![json!({ "text": prompts::text_prompt(text) })];
        self.generate(parts, "text").await
    }

    /// Ask for quiz questions from a chunk of page images.
    ///
    /// The images come first and the instruction text last, so the model
    /// reads the pages before the task description references them.
    pub async fn generate_from_images(
        &self,
        images: &[ImageData],
    ) -> Result<Vec<Question>, Doc2QuizError> {
        let mut parts: Vec<Value> = images
            .iter()
            .map(|img| {
                json!({
                    "inlineData": {
                        "mimeType": img.mime_type,
                        "data": img.data,
                    }
                })
            })
            .collect();
        parts.push(json!({ "text": prompts::IMAGE_PROMPT }));
        self.generate(parts, "images").await
    }

    async fn generate(
        &self,
        parts: Vec<Value>,
        input: &'static str,
    ) -> Result<Vec<Question>, Doc2QuizError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut generation_config = json!({
            "responseMimeType": "application/json",
            "responseSchema": RESPONSE_SCHEMA.clone(),
            "temperature": self.temperature,
        });
        if let Some(max) = self.max_output_tokens {
            generation_config["maxOutputTokens"] = json!(max);
        }

        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": generation_config,
        });

        debug!("POST {url} ({input} request, {} parts)", part_count(&body));

        // The key travels as a query parameter, kept out of the logged URL.
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Doc2QuizError::ApiFailure {
                input: input.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| Doc2QuizError::ApiFailure {
                input: input.to_string(),
                detail: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(Doc2QuizError::ApiFailure {
                input: input.to_string(),
                detail: format!("HTTP {status}: {}", clip(&body_text, 500)),
            });
        }

        let parsed: GenerateContentResponse = match serde_json::from_str(&body_text) {
            Ok(p) => p,
            Err(e) => {
                warn!("Unparseable generateContent response ({e}); returning no questions");
                return Ok(Vec::new());
            }
        };

        let reply = parsed.reply_text();
        match parse_questions(&reply) {
            Some(questions) => {
                debug!("Model returned {} usable questions", questions.len());
                Ok(questions)
            }
            None => {
                warn!("Model reply was not valid question JSON; returning no questions");
                Ok(Vec::new())
            }
        }
    }
}

fn part_count(body: &Value) -> usize {
    body["contents"][0]["parts"]
        .as_array()
        .map(Vec::len)
        .unwrap_or(0)
}

fn clip(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ── Response shape ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn reply_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ── Reply parsing ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Strip a leading ` ```json ` (or bare ` ``` `) fence token and a trailing
/// ` ``` ` token. Models sometimes add them despite the JSON response mode.
fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest.trim_start();
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Parse the model's reply into questions, or `None` when the reply is not
/// the expected envelope. Questions whose answer index falls outside their
/// own option list are dropped.
fn parse_questions(raw: &str) -> Option<Vec<Question>> {
    let cleaned = strip_code_fence(raw);
    let envelope: QuestionsEnvelope = serde_json::from_str(cleaned).ok()?;
    Some(sanitize(envelope.questions))
}

fn sanitize(questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| {
            let in_range = q.correct_answer_index < q.options.len();
            if !in_range {
                warn!(
                    "Dropping question with correctAnswerIndex {} but {} options: {:?}",
                    q.correct_answer_index,
                    q.options.len(),
                    q.question_text
                );
            }
            in_range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_stripping_handles_json_and_bare_fences() {
        assert_eq!(
            strip_code_fence("```json\n{\"questions\": []}\n```"),
            "{\"questions\": []}"
        );
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parse_questions_accepts_the_envelope() {
        let raw = r#"{
            "questions": [{
                "questionText": "What is 2 + 2?",
                "options": ["3", "4", "5", "6"],
                "correctAnswerIndex": 1,
                "reason": "Basic arithmetic."
            }]
        }"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "What is 2 + 2?");
        assert_eq!(questions[0].correct_answer_index, 1);
    }

    #[test]
    fn parse_questions_rejects_non_json() {
        assert!(parse_questions("I could not find any questions.").is_none());
        assert!(parse_questions("").is_none());
    }

    #[test]
    fn parse_questions_tolerates_fenced_reply() {
        let raw = "```json\n{\"questions\": []}\n```";
        assert_eq!(parse_questions(raw).unwrap(), Vec::new());
    }

    #[test]
    fn sanitize_drops_out_of_range_answer_index() {
        let keep = Question {
            question_text: "Keep".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer_index: 1,
            reason: String::new(),
        };
        let drop = Question {
            question_text: "Drop".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer_index: 5,
            reason: String::new(),
        };
        let out = sanitize(vec![keep.clone(), drop]);
        assert_eq!(out, vec![keep]);
    }

    #[test]
    fn reply_text_concatenates_first_candidate_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "{\"questions\":" },
                        { "text": " []}" }
                    ]
                }
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.reply_text(), "{\"questions\": []}");
    }

    #[test]
    fn client_construction_rejects_blank_key() {
        let config = GenerationConfig::default();
        assert!(GeminiClient::new("  ", &config).is_err());
        let client = GeminiClient::new("test-key", &config).unwrap();
        assert_eq!(format!("{client:?}").contains("test-key"), false);
    }
}
