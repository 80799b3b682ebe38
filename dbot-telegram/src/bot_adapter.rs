//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{parse_message_id, Bot as CoreBot, Chat, DbotError, Result};
use std::path::Path;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile, KeyboardButton, KeyboardMarkup, MessageId},
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn bot_error(e: teloxide::RequestError) -> DbotError {
    DbotError::Bot(e.to_string())
}

/// One button per row; the keyboard is shrunk to fit its labels.
fn menu_keyboard(buttons: &[&str]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = buttons
        .iter()
        .map(|label| vec![KeyboardButton::new(*label)])
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard()
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(sent.id.to_string())
    }

    async fn send_menu(&self, chat: &Chat, text: &str, buttons: &[&str]) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_markup(menu_keyboard(buttons))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_photo(&self, chat: &Chat, path: &Path) -> Result<()> {
        let size = tokio::fs::metadata(path).await?.len();
        debug!(chat_id = chat.id, path = %path.display(), size, "Uploading photo");
        self.bot
            .send_photo(ChatId(chat.id), InputFile::file(path.to_path_buf()))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .delete_message(ChatId(chat.id), MessageId(id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }
}
