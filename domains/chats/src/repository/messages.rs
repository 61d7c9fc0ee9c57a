//! Chat message repository

use converse_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::{insert_message_tx, next_sequence_tx, MESSAGE_COLUMNS};
use crate::domain::entities::ChatMessage;

#[derive(Clone)]
pub struct ChatMessageRepository {
    pool: PgPool,
}

impl ChatMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's chat history, ordered by sequence ASC (oldest first)
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ChatMessage>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE user_id = $1 ORDER BY sequence ASC"
        );
        let messages = sqlx::query_as::<_, ChatMessage>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    /// Append a user message and the assistant reply as one atomic unit.
    ///
    /// Both rows are committed together, with consecutive sequence numbers
    /// claimed inside the transaction. A failed completion never reaches
    /// this method, so a failed request leaves the history untouched.
    pub async fn append_exchange(
        &self,
        user_id: Uuid,
        user_content: String,
        assistant_content: String,
        model: String,
    ) -> Result<(ChatMessage, ChatMessage)> {
        let mut tx = self.pool.begin().await?;

        let user_seq = next_sequence_tx(&mut tx, user_id).await?;
        let user_msg = ChatMessage::new_user(user_id, user_content, user_seq)?;
        let assistant_msg =
            ChatMessage::new_assistant(user_id, assistant_content, user_seq + 1, model)?;

        let created_user = insert_message_tx(&mut tx, &user_msg).await?;
        let created_assistant = insert_message_tx(&mut tx, &assistant_msg).await?;

        tx.commit().await?;

        Ok((created_user, created_assistant))
    }

    /// Delete a user's entire chat history, returning the row count
    pub async fn clear_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashSet;

    async fn setup_test_db() -> PgPool {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/converse_test".to_string());
        PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .unwrap()
    }

    async fn create_test_user(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, name) VALUES ($1, $2, 'Test User')",
        )
        .bind(id)
        .bind(format!("{id}@test.local"))
        .execute(pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_concurrent_appends_claim_distinct_sequences() {
        let pool = setup_test_db().await;
        let user_id = create_test_user(&pool).await;
        let repo = ChatMessageRepository::new(pool.clone());

        // Two writers racing on an initially empty history. The users-row
        // lock in next_sequence_tx must serialize them; without it both
        // compute sequence 1 and one insert violates UNIQUE(user_id, sequence).
        let a = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.append_exchange(
                    user_id,
                    "first question".to_string(),
                    "first answer".to_string(),
                    "gpt-3.5-turbo".to_string(),
                )
                .await
            })
        };
        let b = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.append_exchange(
                    user_id,
                    "second question".to_string(),
                    "second answer".to_string(),
                    "gpt-3.5-turbo".to_string(),
                )
                .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let history = repo.list_by_user(user_id).await.unwrap();
        assert_eq!(history.len(), 4);

        let sequences: HashSet<i32> = history.iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, (1..=4).collect::<HashSet<i32>>());

        repo.clear_for_user(user_id).await.unwrap();
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
