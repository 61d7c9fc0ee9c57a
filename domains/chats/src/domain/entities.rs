//! Domain entities for the Chats domain
//!
//! A user's chat history is an ordered, append-only sequence of
//! role-tagged messages. The service only ever appends (one user message
//! plus one assistant reply) or clears the whole history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use converse_common::{Error, Result};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Maximum model string length (varchar(100))
const MAX_MODEL_LENGTH: usize = 100;

/// Chat message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// Model that produced the message; assistant messages only
    pub model: Option<String>,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn new_user(user_id: Uuid, content: String, sequence: i32) -> Result<Self> {
        Self::validate_content(&content)?;
        Self::validate_sequence(sequence)?;

        Ok(ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            role: MessageRole::User,
            content,
            model: None,
            sequence,
            created_at: Utc::now(),
        })
    }

    /// Create a new assistant message
    pub fn new_assistant(
        user_id: Uuid,
        content: String,
        sequence: i32,
        model: String,
    ) -> Result<Self> {
        Self::validate_content(&content)?;
        Self::validate_sequence(sequence)?;

        if model.is_empty() || model.len() > MAX_MODEL_LENGTH {
            return Err(Error::Validation(format!(
                "Model must be between 1 and {} characters",
                MAX_MODEL_LENGTH
            )));
        }

        Ok(ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            role: MessageRole::Assistant,
            content,
            model: Some(model),
            sequence,
            created_at: Utc::now(),
        })
    }

    /// Create a new system message
    pub fn new_system(user_id: Uuid, content: String, sequence: i32) -> Result<Self> {
        Self::validate_content(&content)?;
        Self::validate_sequence(sequence)?;

        Ok(ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            role: MessageRole::System,
            content,
            model: None,
            sequence,
            created_at: Utc::now(),
        })
    }

    /// Validate message content (CHECK (length(trim(content)) > 0))
    pub fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate sequence (CHECK (sequence >= 1))
    fn validate_sequence(sequence: i32) -> Result<()> {
        if sequence < 1 {
            return Err(Error::Validation(
                "Message sequence must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
