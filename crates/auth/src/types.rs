//! Auth read-model types
//!
//! Lightweight view of the user row owned by the chats domain schema.
//! Carries only the fields needed for authentication.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lightweight identity for authenticated users
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
