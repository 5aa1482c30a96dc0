//! Instruction prompts and the response schema for question generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing extraction behaviour (e.g. how
//!    bilingual duplicates are handled) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts and the schema
//!    directly without a live API call, so regressions are easy to catch.
//!
//! The rules below are design intent, not caller-configurable: extract every
//! question, drop page furniture, keep one language for duplicates, and
//! return an empty list rather than failing when nothing is found.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Prompt for the text path. The extracted document text is appended after
/// this preamble via [`text_prompt`].
pub const TEXT_PROMPT_PREAMBLE: &str = r#"You are an expert quiz creator. Analyze the following text, extracted from a question paper, and convert it into a structured list of multiple-choice questions.

Follow these rules precisely:

1. EXTRACT EVERYTHING
   - Identify every multiple-choice question present in the text
   - Keep each question's full wording and all of its options

2. FILTER NOISE
   - Ignore page numbers, headers, footers, and watermarks
   - Ignore instructions to the candidate and marking schemes

3. HANDLE DUPLICATES
   - The paper may repeat the same question in two languages
   - Include such a question only ONCE, preferring the English rendering

4. OUTPUT FORMAT
   - Output ONLY a JSON object conforming exactly to the response schema
   - Do NOT add prose, commentary, or markdown fences
   - If no questions are found, return {"questions": []} rather than failing

Here is the text:

"#;

/// Prompt for the image path. Page images ride alongside this as inline
/// parts of the same request.
pub const IMAGE_PROMPT: &str = r#"You are an expert quiz creator. Analyze the following series of images, which are the pages of a single document, and convert their content into a structured list of multiple-choice questions.

Follow these rules precisely:

1. EXTRACT EVERYTHING
   - Identify every multiple-choice question visible on the pages
   - Keep each question's full wording and all of its options

2. FILTER NOISE
   - Ignore page numbers, headers, footers, and watermarks
   - Ignore instructions to the candidate and marking schemes

3. HANDLE DUPLICATES
   - The pages may repeat the same question in two languages
   - Include such a question only ONCE, preferring the English rendering

4. OUTPUT FORMAT
   - Output ONLY a JSON object conforming exactly to the response schema
   - Do NOT add prose, commentary, or markdown fences
   - If no questions are found, return {"questions": []} rather than failing"#;

/// Build the full text-path prompt for a document's extracted text.
pub fn text_prompt(text: &str) -> String {
    format!("{TEXT_PROMPT_PREAMBLE}{text}")
}

/// JSON schema the service is constrained to, passed as
/// `generationConfig.responseSchema`.
///
/// Field names here are the wire names of [`crate::model::Question`]; the
/// two must stay in sync or every response degrades to an empty list.
pub static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "description": "The list of multiple-choice questions extracted from the document.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "questionText": {
                            "type": "STRING",
                            "description": "The full text of the question."
                        },
                        "options": {
                            "type": "ARRAY",
                            "description": "4-5 possible answers for the question.",
                            "items": { "type": "STRING" }
                        },
                        "correctAnswerIndex": {
                            "type": "INTEGER",
                            "description": "The 0-based index of the correct answer in the options array."
                        },
                        "reason": {
                            "type": "STRING",
                            "description": "A brief explanation of why the answer is correct."
                        }
                    },
                    "required": ["questionText", "options", "correctAnswerIndex", "reason"]
                }
            }
        },
        "required": ["questions"]
    })
});
