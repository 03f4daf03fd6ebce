use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    terminal,
};
use tracing::{debug, warn};

use crate::clients::openai::models::OpenAIModel;
use crate::error::QuizError;
use crate::prompts::Difficulty;

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Find the API key, asking on the terminal when it is not configured.
    ///
    /// Waits 15 seconds for input. An empty answer or a timeout is a
    /// `QuizError::Configuration`.
    fn find_key_with_user() -> Result<String, QuizError> {
        if let Some(key) = Self::find_key() {
            return Ok(key);
        }

        print!(
            "Environment variable {} not found. Please enter the API key (15 second timeout): ",
            Self::KEY_NAME
        );
        let _ = io::stdout().flush();

        let (sender, receiver) = std::sync::mpsc::channel();

        thread::spawn(move || {
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_ok() {
                let _ = sender.send(input.trim().to_string());
            }
        });

        let api_key = match receiver.recv_timeout(Duration::from_secs(15)) {
            Ok(input) if !input.is_empty() => input,
            _ => {
                return Err(QuizError::Configuration(format!(
                    "{} is required to generate quizzes",
                    Self::KEY_NAME
                )))
            }
        };

        if Self::prompt_save_to_env() {
            if let Err(e) = Self::save_to_env_file(&api_key) {
                warn!(error = %e, "Failed to save API key to .env file");
            } else {
                println!("API key saved to .env file");
            }
        }

        Ok(api_key)
    }

    /// Prompt user if they want to save the API key to .env file
    fn prompt_save_to_env() -> bool {
        print!("Add {} to .env file? (y/N): ", Self::KEY_NAME);
        let _ = io::stdout().flush();

        if let Ok(response) = Self::read_single_key() {
            println!("{}", response);
            return response == "y";
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            input.trim().eq_ignore_ascii_case("y")
        } else {
            false
        }
    }

    /// Attempt to read a single keystroke
    fn read_single_key() -> Result<String, Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;

        let result = if event::poll(Duration::from_secs(30))? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Char('y' | 'Y'),
                    ..
                }) => "y",
                _ => "n",
            }
        } else {
            "n"
        };

        terminal::disable_raw_mode()?;
        Ok(result.to_string())
    }

    /// Append the API key to the .env file unless it is already there
    fn save_to_env_file(api_key: &str) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(content) = std::fs::read_to_string(".env") {
            if content.contains(&format!("{}=", Self::KEY_NAME)) {
                return Ok(());
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(".env")?;
        file.write_all(format!("{}={}\n", Self::KEY_NAME, api_key).as_bytes())?;

        Ok(())
    }
}

/// Everything one quiz generation needs, passed explicitly instead of read
/// from widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    /// Credential for the language model. `None` means the user has not supplied one yet.
    pub api_key: Option<String>,
    pub model: OpenAIModel,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub answers_per_question: usize,
    pub temperature: f32,
    /// Upper bound on passages requested from the context fetcher.
    pub top_k_results: usize,
    /// Language the questions and answers must be written in, e.g. "Korean".
    /// `None` leaves it to the model.
    pub language: Option<String>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: OpenAIModel::default(),
            difficulty: Difficulty::default(),
            question_count: 10,
            answers_per_question: 4,
            temperature: 0.1,
            top_k_results: 5,
            language: None,
        }
    }
}

impl KeyFromEnv for QuizConfig {
    const KEY_NAME: &'static str = "OPENAI_API_KEY";
}

impl QuizConfig {
    /// Environment variable that overrides the chat model id.
    pub const MODEL_VAR: &'static str = "QUIZGPT_MODEL";

    /// Build a config from the environment (and `.env`). A missing key is not
    /// an error here; it is reported by `require_api_key`.
    pub fn from_env() -> Self {
        let api_key = Self::find_key();
        let model = env::var(Self::MODEL_VAR)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .map(|m| OpenAIModel::from_id(m.trim()))
            .unwrap_or_default();

        debug!(has_key = api_key.is_some(), model = %model.id(), "Loaded quiz configuration");
        Self {
            api_key,
            model,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The credential, or the configuration error the user must resolve first.
    pub fn require_api_key(&self) -> Result<&str, QuizError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                QuizError::Configuration(format!(
                    "Please provide your OpenAI API key ({})",
                    Self::KEY_NAME
                ))
            })
    }
}
