//! Mock implementation of [`dbot_core::Bot`] for dispatcher tests.
//!
//! Records every outbound call in order so tests can assert on what the user would see.

use async_trait::async_trait;
use dbot_core::{Bot, Chat, DbotError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Menu { chat_id: i64, text: String, buttons: Vec<String> },
    /// `dimensions` is read from the file at send time; `None` if it was not a readable image.
    Photo { chat_id: i64, dimensions: Option<(u32, u32)> },
    Deleted { chat_id: i64, message_id: String },
}

#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicUsize,
    fail_photo: bool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bot whose `send_photo` records the call and then fails.
    pub fn failing_photo() -> Self {
        Self {
            fail_photo: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to `chat_id`, in order (plain messages and menus).
    pub fn texts(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { chat_id: c, text } | Sent::Menu { chat_id: c, text, .. } if c == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self, chat_id: i64) -> Option<String> {
        self.texts(chat_id).pop()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

/// Sniffs the format from content, like Telegram does, instead of trusting the extension.
fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    let image = image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;
    Some((image.width(), image.height()))
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.push(Sent::Text {
            chat_id: chat.id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        self.send_message(chat, text).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
        Ok(id.to_string())
    }

    async fn send_menu(&self, chat: &Chat, text: &str, buttons: &[&str]) -> Result<()> {
        self.push(Sent::Menu {
            chat_id: chat.id,
            text: text.to_string(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat: &Chat, path: &Path) -> Result<()> {
        let dimensions = read_dimensions(path);
        self.push(Sent::Photo {
            chat_id: chat.id,
            dimensions,
        });
        if self.fail_photo {
            return Err(DbotError::Bot("upload rejected".to_string()));
        }
        Ok(())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        self.push(Sent::Deleted {
            chat_id: chat.id,
            message_id: message_id.to_string(),
        });
        Ok(())
    }
}
