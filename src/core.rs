//! Low-level model access shared by the question generator and the formatter.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::config::QuizConfig;
use crate::error::AIError;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Prompt templating and parsing of the result happen in
/// `QuizGenerator`.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Pick up credential and sampling settings after the quiz config changed.
    /// Clients without such settings keep the default no-op.
    fn configure(&mut self, _config: &QuizConfig) {}

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn configure(&mut self, config: &QuizConfig) {
        self.as_mut().configure(config)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}
