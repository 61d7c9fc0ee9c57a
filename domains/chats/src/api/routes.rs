//! Route definitions for the Chats domain API

use axum::{routing::get, Router};

use super::handlers::messages;
use super::middleware::ChatsState;

/// Create all Chats domain API routes
pub fn routes() -> Router<ChatsState> {
    Router::new().route(
        "/v1/chat/messages",
        get(messages::list_messages)
            .post(messages::send_message)
            .delete(messages::clear_messages),
    )
}
