//! Per-chat dialog state. Each chat has its own async mutex; a turn holds it from start to finish,
//! so turns of one chat never interleave while other chats proceed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// What the next message from a chat means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitingImagePrompt,
    AwaitingWikiQuery,
}

#[derive(Clone, Default)]
pub struct DialogStateStore {
    states: Arc<RwLock<HashMap<i64, Arc<Mutex<DialogState>>>>>,
}

impl DialogStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state slot of `chat_id`, creating an `Idle` one on first use.
    pub async fn slot(&self, chat_id: i64) -> Arc<Mutex<DialogState>> {
        if let Some(slot) = self.states.read().await.get(&chat_id) {
            return slot.clone();
        }
        self.states
            .write()
            .await
            .entry(chat_id)
            .or_default()
            .clone()
    }

    /// Snapshot of the current state (waits for a running turn of that chat).
    pub async fn get(&self, chat_id: i64) -> DialogState {
        *self.slot(chat_id).await.lock().await
    }
}
