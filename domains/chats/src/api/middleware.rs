//! Chats domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use converse_auth::AuthBackend;
use converse_llm::ChatService;

use crate::ChatRepositories;

/// Application state for the Chats domain
#[derive(Clone)]
pub struct ChatsState {
    pub repos: ChatRepositories,
    pub auth: AuthBackend,
    pub llm: Arc<dyn ChatService>,
    /// Model identifier sent with completion requests
    pub model: String,
}

impl FromRef<ChatsState> for AuthBackend {
    fn from_ref(state: &ChatsState) -> Self {
        state.auth.clone()
    }
}
