use thiserror::Error;

/// Top-level error for one quiz interaction cycle.
///
/// Every variant maps to a user-visible state; none of them is retried
/// automatically.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Could not build a quiz from the model output: {0}")]
    Parse(#[from] ParseError),
    #[error("No reference passages found for topic '{0}'")]
    EmptyContext(String),
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Mock error: {0}")]
    Mock(String),
}

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Search API error: {0}")]
    Api(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization error: {0}. Raw response: {1}")]
    JsonDeserialization(#[source] serde_json::Error, String),
    #[error("Question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Question index {index} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("'{answer}' is not an option for question {index}")]
    UnknownAnswer { index: usize, answer: String },
    #[error("Quiz already submitted; retry to answer again")]
    AlreadySubmitted,
    #[error("Quiz has not been submitted yet")]
    NotSubmitted,
}
