//! Converse LLM service
//!
//! The completion requester: given an ordered conversation, obtain one
//! assistant reply from an OpenAI-style chat-completion API. Rate-limit
//! responses (HTTP 429) are retried with exponential backoff and jitter;
//! every other failure aborts immediately.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod mock;
pub mod openai;
pub mod retry;

pub use mock::MockChatService;
pub use openai::OpenAiService;
pub use retry::{retry_with_backoff, BackoffPolicy};

/// Terminal and transient completion failures.
///
/// `RateLimited` is internal to the retry loop: it only escapes as
/// `RetriesExhausted` once all attempts are consumed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    #[error("completion failed after exhausting retries while rate limited")]
    RetriesExhausted,

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl CompletionError {
    /// Classifier for the retry combinator: only rate limits are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CompletionError::RateLimited)
    }
}

/// Message role on the completion wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

/// One role-tagged message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

/// A completion request: the full ordered conversation plus model selection.
///
/// Callers must pass a non-empty message list ending with a user message.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier; empty means "use the service default"
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

/// One reply produced by the upstream model
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
}

/// Completion service configuration, passed at construction.
///
/// No implicit environment reads happen inside the service; injecting
/// fake credentials and endpoints is enough to test it.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub organization: Option<String>,
    /// Base URL override (local proxies, tests)
    pub base_url: Option<String>,
    pub default_model: String,
    pub retry: BackoffPolicy,
}

/// Chat completion service abstraction
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    /// Request one completion for the given conversation.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, CompletionError>;

    /// Model used when the request does not name one.
    fn default_model(&self) -> &str;
}

/// Factory selecting a concrete service by provider name
pub struct ChatServiceFactory;

impl ChatServiceFactory {
    /// Create a chat service: `"mock"` for the deterministic mock,
    /// anything else for the OpenAI client.
    pub fn create(provider: &str, config: LlmConfig) -> Arc<dyn ChatService> {
        match provider {
            "mock" => {
                tracing::info!("Using mock chat service");
                Arc::new(MockChatService::new())
            }
            _ => Arc::new(OpenAiService::new(config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_classifier() {
        assert!(CompletionError::RateLimited.is_retryable());
        assert!(!CompletionError::RetriesExhausted.is_retryable());
        assert!(!CompletionError::Upstream("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_llm_role_serialization_lowercase() {
        assert_eq!(serde_json::to_string(&LlmRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&LlmRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(
            serde_json::to_string(&LlmRole::System).unwrap(),
            "\"system\""
        );
    }

    #[test]
    fn test_factory_selects_mock() {
        let config = LlmConfig {
            api_key: "test-key".to_string(),
            organization: None,
            base_url: None,
            default_model: "gpt-3.5-turbo".to_string(),
            retry: BackoffPolicy::default(),
        };
        let service = ChatServiceFactory::create("mock", config);
        assert_eq!(service.default_model(), "mock-model");
    }

    #[test]
    fn test_factory_selects_openai() {
        let config = LlmConfig {
            api_key: "test-key".to_string(),
            organization: None,
            base_url: None,
            default_model: "gpt-3.5-turbo".to_string(),
            retry: BackoffPolicy::default(),
        };
        let service = ChatServiceFactory::create("openai", config);
        assert_eq!(service.default_model(), "gpt-3.5-turbo");
    }
}
