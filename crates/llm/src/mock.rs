//! Mock chat service implementation
//!
//! Minimal mock used by `ChatServiceFactory` when the provider is
//! `"mock"`. Returns deterministic responses for testing and local
//! development without an API key.

use crate::{ChatService, CompletionError, CompletionRequest, CompletionResponse};

/// Mock chat service for testing
#[derive(Debug, Clone, Default)]
pub struct MockChatService;

impl MockChatService {
    /// Create a new mock chat service
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChatService for MockChatService {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        tracing::info!("Mock chat service processing completion request");

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        // Echo a response based on the last user message
        let last_message = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("empty");

        let content = format!("Mock response to: {}", last_message);
        let prompt_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let completion_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            prompt_tokens,
            completion_tokens,
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
