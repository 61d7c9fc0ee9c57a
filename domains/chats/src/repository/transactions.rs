//! Transaction helpers for the Chats domain

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::ChatMessage;

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, user_id, role, content, model, sequence, created_at";

/// Get the next sequence number for a user's history within a transaction.
///
/// Locks the users row before reading MAX(sequence), so concurrent appends
/// for the same user serialize on the parent row. Locking chat_messages rows
/// would not: an empty history has nothing to lock, and under READ COMMITTED
/// the MAX scan cannot see rows committed after this transaction's snapshot.
pub(crate) async fn next_sequence_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<i32, sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let next = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(sequence), 0) + 1 FROM chat_messages WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(next)
}

/// Insert a message within a transaction
pub(crate) async fn insert_message_tx(
    tx: &mut Transaction<'_, Postgres>,
    msg: &ChatMessage,
) -> Result<ChatMessage, sqlx::Error> {
    let query = format!(
        "INSERT INTO chat_messages ({MESSAGE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {MESSAGE_COLUMNS}"
    );
    let created = sqlx::query_as::<_, ChatMessage>(&query)
        .bind(msg.id)
        .bind(msg.user_id)
        .bind(msg.role)
        .bind(&msg.content)
        .bind(&msg.model)
        .bind(msg.sequence)
        .bind(msg.created_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(created)
}
