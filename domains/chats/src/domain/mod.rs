//! Domain layer for the Chats domain

pub mod entities;
