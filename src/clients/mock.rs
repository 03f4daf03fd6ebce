use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::{core::LowLevelClient, error::AIError};

/// One scripted reply of the mock client.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    Success(String),
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    prompts: Vec<String>,
}

/// Controls a `MockClient` after it has been handed to a generator.
///
/// Responses are served in FIFO order; every prompt received is recorded.
#[derive(Debug, Default)]
pub struct MockHandle {
    state: Mutex<MockState>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded prompts from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.lock().responses.push_back(MockResponse::Success(text.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.lock().responses.push_back(MockResponse::Error(message.into()));
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }
}

/// Mock client for tests and offline runs.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle {
            state: Mutex::new(MockState {
                responses: responses.into(),
                prompts: Vec::new(),
            }),
        });
        (Self { handle: handle.clone() }, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let mut state = self.handle.lock();
        debug!(prompt_len = prompt.len(), queued = state.responses.len(), "Mock client called");
        state.prompts.push(prompt);
        match state.responses.pop_front() {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(AIError::Mock(message)),
            None => Err(AIError::Mock("no scripted response left".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_responses_in_order_and_records_prompts() {
        let (client, handle) = MockClient::new();
        handle.push_response("first");
        handle.push_error("boom");

        assert_eq!(client.ask_raw("a".into()).await.unwrap(), "first");
        assert!(matches!(client.ask_raw("b".into()).await, Err(AIError::Mock(m)) if m == "boom"));
        assert!(client.ask_raw("c".into()).await.is_err());
        assert_eq!(handle.prompts(), vec!["a", "b", "c"]);
        assert_eq!(handle.remaining(), 0);
    }
}
