use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use self::models::OpenAIModel;
use crate::config::QuizConfig;
use crate::core::LowLevelClient;
use crate::error::{AIError, OpenAIError, QuizError};

pub mod models;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: OpenAIModel,
    pub max_tokens: u32,
    pub temperature: f32,
    pub base_url: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: OpenAIModel::default(),
            max_tokens: 4096,
            temperature: 0.1,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenAIConfig {
    /// Derive the client settings from a quiz configuration.
    /// Fails with `QuizError::Configuration` when no credential was supplied.
    pub fn from_quiz_config(config: &QuizConfig) -> Result<Self, QuizError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            ..Self::default()
        })
    }
}

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    config: OpenAIConfig,
    http: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Self {
        info!(model = %config.model.id(), "Creating new OpenAI client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn request_body(&self, prompt: String) -> ChatRequest<'_> {
        ChatRequest {
            model: self.config.model.id(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl LowLevelClient for OpenAIClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let body = self.request_body(prompt);
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        debug!(%url, "Sending request to OpenAI API");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                AIError::OpenAI(OpenAIError::Http(e.to_string()))
            })?;

        let status = resp.status();
        debug!(%status, "Received response from OpenAI API");

        if status == 401 {
            error!("OpenAI API authentication failed");
            return Err(AIError::OpenAI(OpenAIError::Authentication));
        }
        if status == 429 {
            warn!("OpenAI API rate limit exceeded");
            return Err(AIError::OpenAI(OpenAIError::RateLimit));
        }
        if !status.is_success() {
            let txt = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(%status, error = %txt, "OpenAI API error");
            return Err(AIError::OpenAI(OpenAIError::Api(txt)));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI response JSON");
            AIError::OpenAI(OpenAIError::Http(e.to_string()))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AIError::OpenAI(OpenAIError::Api("No choices in response".into())))?;

        info!(response_len = content.len(), "Received OpenAI response");
        Ok(content)
    }

    fn configure(&mut self, config: &QuizConfig) {
        if let Ok(api_key) = config.require_api_key() {
            self.config.api_key = api_key.to_string();
        }
        self.config.model = config.model.clone();
        self.config.temperature = config.temperature;
        debug!(model = %self.config.model.id(), "OpenAI client reconfigured");
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
