//! API layer for the Chats domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ChatsState;
pub use routes::routes;
