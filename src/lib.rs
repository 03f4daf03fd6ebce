pub mod app;
pub mod cache;
pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod interceptors;
pub mod json_utils;
pub mod parser;
pub mod prompts;
pub mod quiz;
pub mod retrieval;
pub mod session;

// Convenient re-exports
pub use app::{AppState, QuizApp};
pub use config::QuizConfig;
pub use error::{ParseError, QuizError, SessionError};
pub use generator::QuizGenerator;
pub use parser::parse_quiz;
pub use prompts::Difficulty;
pub use quiz::{Answer, Question, Quiz};
pub use session::{Feedback, Outcome, QuizSession, Score, SessionPhase};
