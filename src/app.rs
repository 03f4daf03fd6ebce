//! One request/response cycle of the quiz front end, independent of any UI.
//!
//! `QuizApp::prepare` checks the credential, looks up passages for the topic,
//! and generates (or reuses) a quiz. Every outcome, including failures, comes
//! back as an `AppState` the front end renders.

use tracing::{info, warn};

use crate::cache::QuizCache;
use crate::config::QuizConfig;
use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::generator::QuizGenerator;
use crate::parser::parse_quiz;
use crate::prompts::Difficulty;
use crate::quiz::Quiz;
use crate::retrieval::{ContextFetcher, Passage};
use crate::session::QuizSession;

#[derive(Debug)]
pub enum AppState {
    /// No credential for the language model yet.
    NeedsApiKey(String),
    /// No topic entered.
    NeedsTopic,
    /// The topic search found nothing; generation was not attempted.
    NoContext { topic: String },
    /// A quiz is ready to be answered.
    Ready {
        topic: String,
        difficulty: Difficulty,
        session: QuizSession,
    },
    /// Retrieval, the model or the parser failed. The user may regenerate.
    Failed(QuizError),
}

impl AppState {
    /// Message for the states that carry no quiz.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::NeedsApiKey(msg) => Some(msg.clone()),
            Self::NeedsTopic => Some("Please enter a quiz topic.".to_string()),
            Self::NoContext { topic } => Some(format!(
                "No reference material found for '{}'. Try another topic.",
                topic
            )),
            Self::Ready { .. } => None,
            Self::Failed(err) => Some(format!("Quiz generation failed: {}", err)),
        }
    }
}

#[derive(Debug)]
pub struct QuizApp<C: LowLevelClient, F: ContextFetcher> {
    config: QuizConfig,
    generator: QuizGenerator<C>,
    fetcher: F,
    cache: QuizCache,
    current_topic: Option<String>,
}

impl<C: LowLevelClient, F: ContextFetcher> QuizApp<C, F> {
    /// The generator and its client are brought in line with `config`.
    pub fn new(config: QuizConfig, mut generator: QuizGenerator<C>, fetcher: F) -> Self {
        generator.configure(&config);
        Self {
            config,
            generator,
            fetcher,
            cache: QuizCache::new(),
            current_topic: None,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn generator(&self) -> &QuizGenerator<C> {
        &self.generator
    }

    pub fn cache(&self) -> &QuizCache {
        &self.cache
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.update_config(|config| config.api_key = Some(api_key));
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.update_config(|config| config.language = language);
    }

    /// Change any setting and push it to the generator and its client.
    ///
    /// When a change alters what the model would produce (model, sampling,
    /// counts, language) the generations cached for the current topic are dropped;
    /// its passages stay.
    pub fn update_config(&mut self, change: impl FnOnce(&mut QuizConfig)) {
        let before = self.config.clone();
        change(&mut self.config);
        self.generator.configure(&self.config);

        if changes_generation(&before, &self.config) {
            if let Some(topic) = self.current_topic.as_deref() {
                info!(topic, "generation settings changed, dropping cached quizzes");
                for difficulty in Difficulty::ALL {
                    self.cache.invalidate_generation(topic, difficulty);
                }
            }
        }
    }

    /// Build the state for `topic` at the configured difficulty.
    ///
    /// Passages and formatter output are memoized; switching to a different
    /// topic drops everything cached for the previous one.
    pub async fn prepare(&mut self, topic: &str) -> AppState {
        if let Err(QuizError::Configuration(msg)) = self.config.require_api_key() {
            return AppState::NeedsApiKey(msg);
        }
        let topic = topic.trim();
        if topic.is_empty() {
            return AppState::NeedsTopic;
        }
        self.switch_topic(topic);

        let difficulty = self.config.difficulty;
        match self.load(topic, difficulty).await {
            Ok(quiz) => AppState::Ready {
                topic: topic.to_string(),
                difficulty,
                session: QuizSession::new(quiz),
            },
            Err(QuizError::EmptyContext(topic)) => {
                info!(topic, "no reference passages, nothing to generate");
                AppState::NoContext { topic }
            }
            Err(err) => {
                warn!(topic, error = %err, "quiz preparation failed");
                AppState::Failed(err)
            }
        }
    }

    /// Discard the cached generation for `topic` at the current difficulty and prepare again.
    pub async fn regenerate(&mut self, topic: &str) -> AppState {
        self.cache
            .invalidate_generation(topic.trim(), self.config.difficulty);
        self.prepare(topic).await
    }

    fn switch_topic(&mut self, topic: &str) {
        if let Some(previous) = self.current_topic.as_deref() {
            if previous != topic {
                info!(previous, topic, "topic changed, invalidating cache");
                self.cache.invalidate_topic(previous);
            }
        }
        self.current_topic = Some(topic.to_string());
    }

    async fn passages(&mut self, topic: &str) -> Result<Vec<Passage>, QuizError> {
        if let Some(cached) = self.cache.passages(topic) {
            return Ok(cached.to_vec());
        }
        let passages = self.fetcher.fetch(topic).await?;
        self.cache.insert_passages(topic, passages.clone());
        Ok(passages)
    }

    /// Fails with `QuizError::EmptyContext` before any model call when the topic has no passages.
    async fn load(&mut self, topic: &str, difficulty: Difficulty) -> Result<Quiz, QuizError> {
        let passages = self.passages(topic).await?;
        if passages.is_empty() {
            return Err(QuizError::EmptyContext(topic.to_string()));
        }

        if let Some(raw) = self.cache.generation(topic, difficulty) {
            return Ok(parse_quiz(raw)?);
        }

        let raw = self.generator.generate_raw(&passages, difficulty).await?;
        let quiz = parse_quiz(&raw)?;
        // Only output that decodes is memoized, so a regenerate issues fresh calls
        self.cache.insert_generation(topic, difficulty, raw);
        Ok(quiz)
    }
}

fn changes_generation(before: &QuizConfig, after: &QuizConfig) -> bool {
    before.model != after.model
        || before.temperature != after.temperature
        || before.question_count != after.question_count
        || before.answers_per_question != after.answers_per_question
        || before.language != after.language
}
