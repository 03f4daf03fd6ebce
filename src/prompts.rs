//! Prompt templates for the two model calls: question generation and JSON formatting.

use std::fmt;

use clap::ValueEnum;

use schemars::schema_for;
use serde::{Deserialize, Serialize};

use crate::parser::QuizPayload;

/// Suffix the question generator puts on the correct option.
pub const CORRECT_MARKER: &str = "(o)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// The sentence added to the question prompt for this level.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Easy => "Make the questions very easy.",
            Self::Medium => "Make the questions of average difficulty.",
            Self::Hard => "Make the questions very challenging.",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const QUESTION_EXAMPLES: &str = "\
Question: What is the color of the ocean?
Answers: Red|Yellow|Green|Blue(o)

Question: What is the capital of Korea?
Answers: Bangkok|Seoul(o)|New York|Tokyo

Question: When was Avatar released?
Answers: 2007|2001|2009(o)|1998

Question: Who was Yi Sun-sin?
Answers: A naval admiral(o)|A painter|An actor|A model";

/// Prompt asking the model for delimited multiple-choice questions about `context`.
pub fn questions_prompt(
    context: &str,
    difficulty: Difficulty,
    question_count: usize,
    answers_per_question: usize,
    language: Option<&str>,
) -> String {
    let incorrect = answers_per_question.saturating_sub(1);
    let language = language
        .map(|lang| format!("You MUST use only {lang} on questions and answers.\n"))
        .unwrap_or_default();
    format!(
        "You are a helpful assistant that is role playing as a teacher.
Based ONLY on the following context make {question_count} questions to test the user's knowledge about the text.
Each question should have {answers_per_question} answers, {incorrect} of them must be incorrect and one should be correct.
Use {CORRECT_MARKER} to signal the correct answer.
{language}{instruction}

Question examples:

{QUESTION_EXAMPLES}

Your turn!

Context: {context}
",
        instruction = difficulty.instruction(),
    )
}

const FORMAT_EXAMPLE_OUTPUT: &str = r#"```json
{ "questions": [
        {
            "question": "What is the color of the ocean?",
            "answers": [
                { "answer": "Red", "correct": false },
                { "answer": "Yellow", "correct": false },
                { "answer": "Green", "correct": false },
                { "answer": "Blue", "correct": true }
            ]
        },
        ...
    ]
}
```"#;

/// Prompt asking the model to convert delimited questions into the quiz JSON shape.
pub fn formatting_prompt(questions: &str) -> String {
    let schema = schema_for!(QuizPayload);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "You are a powerful formatting algorithm.

You format exam questions into JSON format.
Answers with {CORRECT_MARKER} are the correct ones.

Example Input:

{QUESTION_EXAMPLES}

Example Output:

{FORMAT_EXAMPLE_OUTPUT}

## Response Format
Respond with JSON matching this schema:
```json
{schema_json}
```

Your turn!

Questions: {questions}
"
    )
}
