//! API handlers for the Chats domain

pub mod messages;
