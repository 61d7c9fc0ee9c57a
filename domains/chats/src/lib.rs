//! Chats domain: per-user chat history backed by an LLM completion service

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{ChatMessage, MessageRole};

// Re-export repository types
pub use repository::{ChatMessageRepository, ChatRepositories};

// Re-export API types
pub use api::routes;
pub use api::ChatsState;
