//! Chat message API handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use converse_auth::AuthUser;
use converse_common::{Error, Result, ValidatedJson};
use converse_llm::{CompletionError, CompletionRequest, LlmMessage, LlmRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ChatsState;
use crate::domain::entities::{ChatMessage, MessageRole};

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message content
    #[validate(length(min = 1))]
    pub content: String,
}

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub model: Option<String>,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            model: m.model,
            sequence: m.sequence,
            created_at: m.created_at,
        }
    }
}

/// Full chat history response
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<MessageResponse>,
}

fn to_llm_role(role: MessageRole) -> LlmRole {
    match role {
        MessageRole::System => LlmRole::System,
        MessageRole::User => LlmRole::User,
        MessageRole::Assistant => LlmRole::Assistant,
    }
}

/// Send a message: forward history + new message upstream, persist the
/// exchange, return the updated history.
///
/// Nothing is persisted when the completion fails; the stored history is
/// only mutated after a successful reply, and then atomically.
pub async fn send_message(
    AuthUser(user): AuthUser,
    State(state): State<ChatsState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<ChatHistoryResponse>> {
    ChatMessage::validate_content(&req.content)?;

    // Snapshot of the stored history, oldest first
    let history = state.repos.messages.list_by_user(user.id).await?;

    // The new user message goes upstream exactly once, as the final entry
    let mut llm_messages: Vec<LlmMessage> = history
        .iter()
        .map(|m| LlmMessage {
            role: to_llm_role(m.role),
            content: m.content.clone(),
        })
        .collect();
    llm_messages.push(LlmMessage {
        role: LlmRole::User,
        content: req.content.clone(),
    });

    let llm_request = CompletionRequest {
        model: state.model.clone(),
        messages: llm_messages,
        max_tokens: None,
    };

    let llm_response = state.llm.complete(llm_request).await.map_err(|e| match e {
        CompletionError::RetriesExhausted => Error::RateLimit(
            "Failed to generate chat completion after multiple retries due to rate limiting"
                .to_string(),
        ),
        other => Error::Upstream(other.to_string()),
    })?;

    state
        .repos
        .messages
        .append_exchange(
            user.id,
            req.content,
            llm_response.content,
            llm_response.model,
        )
        .await?;

    tracing::debug!(
        user_id = %user.id,
        prompt_tokens = llm_response.prompt_tokens,
        completion_tokens = llm_response.completion_tokens,
        "Chat exchange persisted"
    );

    // Re-read so the client sees exactly what was committed
    let updated = state.repos.messages.list_by_user(user.id).await?;
    Ok(Json(ChatHistoryResponse {
        messages: updated.into_iter().map(Into::into).collect(),
    }))
}

/// Return the authenticated user's full chat history, oldest first
pub async fn list_messages(
    AuthUser(user): AuthUser,
    State(state): State<ChatsState>,
) -> Result<Json<ChatHistoryResponse>> {
    let messages = state.repos.messages.list_by_user(user.id).await?;

    Ok(Json(ChatHistoryResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// Delete the authenticated user's entire chat history
pub async fn clear_messages(
    AuthUser(user): AuthUser,
    State(state): State<ChatsState>,
) -> Result<StatusCode> {
    let deleted = state.repos.messages.clear_for_user(user.id).await?;

    tracing::info!(user_id = %user.id, deleted, "Chat history cleared");

    Ok(StatusCode::NO_CONTENT)
}
