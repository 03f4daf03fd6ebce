//! Decodes the formatter's raw reply into a `Quiz`.
//!
//! The formatter usually answers with a fenced ```` ```json ```` block, sometimes
//! with prose around it. Fences and the language tag are stripped first; if the
//! remainder still does not decode, the first JSON object in the text is tried.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ParseError;
use crate::json_utils::first_object;
use crate::quiz::{Answer, Question, Quiz};

/// Wire shape of the formatter output: `{ "questions": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz", description = "Multiple-choice questions with one correct answer each")]
pub struct QuizPayload {
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionPayload {
    /// The question text
    pub question: String,
    /// Answer options in display order
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerPayload {
    pub answer: String,
    /// True for exactly one answer per question
    pub correct: bool,
}

impl TryFrom<QuizPayload> for Quiz {
    type Error = ParseError;

    fn try_from(payload: QuizPayload) -> Result<Self, Self::Error> {
        let questions = payload
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| {
                if q.answers.is_empty() {
                    return Err(ParseError::InvalidQuestion {
                        index,
                        reason: "no answers".to_string(),
                    });
                }
                let correct = q.answers.iter().filter(|a| a.correct).count();
                if correct != 1 {
                    return Err(ParseError::InvalidQuestion {
                        index,
                        reason: format!("expected exactly one correct answer, found {}", correct),
                    });
                }
                let answers = q
                    .answers
                    .into_iter()
                    .map(|a| Answer::new(a.answer, a.correct))
                    .collect();
                Ok(Question::new(q.question, answers))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Quiz::new(questions))
    }
}

/// Strip surrounding code-fence markers and the language tag after the opening fence.
pub fn clean_formatter_output(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_end = rest
            .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
            .unwrap_or(rest.len());
        text = rest[tag_end..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// Decode the formatter's raw reply into a `Quiz`.
///
/// Zero questions is a valid quiz. Any shape deviation, or a question without
/// exactly one correct answer, is a `ParseError`.
#[instrument(target = "quiz_gpt::parser", skip(raw), fields(raw_len = raw.len()))]
pub fn parse_quiz(raw: &str) -> Result<Quiz, ParseError> {
    let cleaned = clean_formatter_output(raw);

    let payload = match serde_json::from_str::<QuizPayload>(cleaned) {
        Ok(payload) => payload,
        Err(err) => match first_object(cleaned).filter(|candidate| *candidate != cleaned) {
            Some(candidate) => {
                debug!(target: "quiz_gpt::parser", "retrying decode on embedded JSON object");
                serde_json::from_str::<QuizPayload>(candidate).map_err(|e| {
                    warn!(target: "quiz_gpt::parser", error = %e, "formatter output did not decode");
                    ParseError::JsonDeserialization(e, raw.to_string())
                })?
            }
            None => {
                warn!(target: "quiz_gpt::parser", error = %err, "formatter output did not decode");
                return Err(ParseError::JsonDeserialization(err, raw.to_string()));
            }
        },
    };

    let quiz = Quiz::try_from(payload)?;
    debug!(target: "quiz_gpt::parser", questions = quiz.len(), "decoded quiz");
    Ok(quiz)
}
