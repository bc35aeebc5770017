//! LLM client trait and the scripted mock used by tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, RtlgenError};
use crate::llm::types::{CompletionResponse, Message};

/// Stateless LLM client - callers own all conversation state.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse>;
}

/// Mock client that replays scripted responses in order.
///
/// Records every request so tests can assert on the exact message
/// history each call was issued with.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    /// Create a mock with a fixed response script.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every request made so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RtlgenError::Llm("mock response script exhausted".to_string()))?;

        Ok(CompletionResponse {
            content,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockLlmClient::new(vec!["first".to_string(), "second".to_string()]);

        let r1 = mock.complete(&[Message::user("a")]).await.unwrap();
        let r2 = mock.complete(&[Message::user("b")]).await.unwrap();

        assert_eq!(r1.content, "first");
        assert_eq!(r2.content, "second");
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockLlmClient::new(vec!["ok".to_string()]);

        let messages = vec![Message::system("sys"), Message::user("prompt")];
        mock.complete(&messages).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][1].content, "prompt");
    }

    #[tokio::test]
    async fn test_mock_exhausted_script_errors() {
        let mock = MockLlmClient::new(vec![]);
        let result = mock.complete(&[Message::user("a")]).await;
        assert!(matches!(result, Err(RtlgenError::Llm(_))));
    }
}
