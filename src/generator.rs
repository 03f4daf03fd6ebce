//! Quiz generation: a question-writing call, a formatting call, then the parser.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::QuizConfig;
use crate::core::LowLevelClient;
use crate::error::{AIError, QuizError};
use crate::interceptors::Interceptor;
use crate::parser::parse_quiz;
use crate::prompts::{formatting_prompt, questions_prompt, Difficulty};
use crate::quiz::Quiz;
use crate::retrieval::{format_passages, Passage};

/// Drives the two templated model calls for one quiz.
#[derive(Debug, Clone)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    question_count: usize,
    answers_per_question: usize,
    language: Option<String>,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C, config: &QuizConfig) -> Self {
        Self {
            client,
            question_count: config.question_count,
            answers_per_question: config.answers_per_question,
            language: config.language.clone(),
            interceptor: None,
        }
    }

    /// Adopt the prompt settings of `config` and pass it on to the client.
    pub fn configure(&mut self, config: &QuizConfig) {
        self.question_count = config.question_count;
        self.answers_per_question = config.answers_per_question;
        self.language = config.language.clone();
        self.client.configure(config);
    }

    /// Record every prompt/response exchange through `interceptor`.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn ask(&self, stage: &str, prompt: String) -> Result<String, AIError> {
        let response = self.client.ask_raw(prompt.clone()).await?;
        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(stage, &prompt, &response).await {
                warn!(stage, error = %e, "Failed to record model exchange");
            }
        }
        Ok(response)
    }

    /// Free-form `Question:`/`Answers:` blocks about `context`.
    #[instrument(target = "quiz_gpt::generator", skip(self, context), fields(context_len = context.len()))]
    pub async fn generate_questions(
        &self,
        context: &str,
        difficulty: Difficulty,
    ) -> Result<String, AIError> {
        let prompt = questions_prompt(
            context,
            difficulty,
            self.question_count,
            self.answers_per_question,
            self.language.as_deref(),
        );
        let questions = self.ask("questions", prompt).await?;
        debug!(target: "quiz_gpt::generator", questions_len = questions.len(), "questions generated");
        Ok(questions)
    }

    /// JSON-shaped rendition of the free-form questions.
    #[instrument(target = "quiz_gpt::generator", skip(self, questions), fields(questions_len = questions.len()))]
    pub async fn format_questions(&self, questions: &str) -> Result<String, AIError> {
        self.ask("formatting", formatting_prompt(questions)).await
    }

    /// Raw formatter output for `passages`, before parsing.
    pub async fn generate_raw(
        &self,
        passages: &[Passage],
        difficulty: Difficulty,
    ) -> Result<String, QuizError> {
        let context = format_passages(passages);
        let questions = self.generate_questions(&context, difficulty).await?;
        Ok(self.format_questions(&questions).await?)
    }

    /// Full pipeline: questions, formatting, parsing.
    #[instrument(target = "quiz_gpt::generator", skip(self, passages), fields(passages = passages.len()))]
    pub async fn generate(
        &self,
        passages: &[Passage],
        difficulty: Difficulty,
    ) -> Result<Quiz, QuizError> {
        let raw = self.generate_raw(passages, difficulty).await?;
        let quiz = parse_quiz(&raw)?;
        info!(target: "quiz_gpt::generator", questions = quiz.len(), %difficulty, "quiz generated");
        Ok(quiz)
    }
}
