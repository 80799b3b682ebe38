//! Bot abstraction for outbound chat operations.
//!
//! [`Bot`] trait is transport-agnostic; dbot-telegram implements it via teloxide, tests use a recording mock.

use crate::error::{DbotError, Result};
use crate::types::Chat;
use async_trait::async_trait;
use std::path::Path;

/// Abstraction for sending and deleting messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a message and returns its id (for a later `delete_message`). `message_id` is transport-specific (e.g. Telegram numeric string).
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;
    /// Sends a text message together with a reply keyboard, one button per label, one label per row.
    async fn send_menu(&self, chat: &Chat, text: &str, buttons: &[&str]) -> Result<()>;
    /// Uploads the image file at `path` as a photo.
    async fn send_photo(&self, chat: &Chat, path: &Path) -> Result<()>;
    /// Deletes a previously sent message.
    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()>;
}

/// Parses a message id string into an i32. Used by transports whose ids are numeric.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| DbotError::Bot(format!("Invalid message_id: {}", s)))
}
