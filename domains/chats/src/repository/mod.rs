//! Repository implementations for the Chats domain

pub mod messages;
mod transactions;

use sqlx::PgPool;

pub use messages::ChatMessageRepository;

/// Combined repository access for the Chats domain
#[derive(Clone)]
pub struct ChatRepositories {
    pool: PgPool,
    pub messages: ChatMessageRepository,
}

impl ChatRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            messages: ChatMessageRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
