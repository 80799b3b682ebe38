//! Menu dispatcher: maps each incoming message and the chat's dialog state to an action.
//!
//! ```text
//! Idle ── "Генерировать изображение" ──▶ AwaitingImagePrompt ── prompt ──▶ image flow ──▶ Idle
//! Idle ── "Получить информацию ..." ───▶ AwaitingWikiQuery ─── query ───▶ lookup ──────▶ Idle
//! Idle ── "Статистика" / "/start" / other text ──▶ reply ──▶ Idle
//! ```

use async_trait::async_trait;
use dbot_core::{Bot, Chat, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use wiki_client::WikiClient;

use crate::image_flow::{ImageFlowOutcome, ImageGenerationFlow};
use crate::menu::{
    format_stats, strip_sentinel, MenuCommand, MENU_BUTTONS, MSG_ASK_IMAGE_PROMPT,
    MSG_ASK_WIKI_QUERY, MSG_CHOOSE_ACTION, MSG_EMPTY_PROMPT, MSG_GENERATION_FAILED,
    MSG_GENERATION_TIMEOUT, MSG_WELCOME,
};
use crate::state::{DialogState, DialogStateStore};
use crate::usage::{UsageAction, UsageStore};

/// Terminal handler of the chain: every message ends here with `Stop`.
#[derive(Clone)]
pub struct MenuDispatcher {
    bot: Arc<dyn Bot>,
    images: ImageGenerationFlow,
    wiki: Arc<WikiClient>,
    usage: UsageStore,
    states: DialogStateStore,
}

impl MenuDispatcher {
    pub fn new(
        bot: Arc<dyn Bot>,
        images: ImageGenerationFlow,
        wiki: Arc<WikiClient>,
        usage: UsageStore,
    ) -> Self {
        Self {
            bot,
            images,
            wiki,
            usage,
            states: DialogStateStore::new(),
        }
    }

    pub fn usage(&self) -> &UsageStore {
        &self.usage
    }

    pub fn states(&self) -> &DialogStateStore {
        &self.states
    }

    /// Handles one message for its chat and returns the chat's next state.
    async fn step(&self, state: DialogState, message: &Message) -> Result<DialogState> {
        match state {
            DialogState::Idle => self.handle_menu(message).await,
            DialogState::AwaitingImagePrompt => {
                self.handle_image_prompt(&message.chat, &message.content).await?;
                Ok(DialogState::Idle)
            }
            DialogState::AwaitingWikiQuery => {
                self.handle_wiki_query(&message.chat, &message.content).await?;
                Ok(DialogState::Idle)
            }
        }
    }

    async fn handle_menu(&self, message: &Message) -> Result<DialogState> {
        let chat = &message.chat;
        match MenuCommand::parse(&message.content) {
            Some(MenuCommand::Start) => {
                self.bot.send_menu(chat, MSG_WELCOME, &MENU_BUTTONS).await?;
                Ok(DialogState::Idle)
            }
            Some(MenuCommand::GenerateImage) => {
                self.bot.send_message(chat, MSG_ASK_IMAGE_PROMPT).await?;
                Ok(DialogState::AwaitingImagePrompt)
            }
            Some(MenuCommand::WikiLookup) => {
                self.bot.send_message(chat, MSG_ASK_WIKI_QUERY).await?;
                Ok(DialogState::AwaitingWikiQuery)
            }
            Some(MenuCommand::Stats) => {
                let record = self.usage.get(chat.id).await;
                self.bot.send_message(chat, &format_stats(&record)).await?;
                Ok(DialogState::Idle)
            }
            None => {
                self.bot.send_message(chat, MSG_CHOOSE_ACTION).await?;
                Ok(DialogState::Idle)
            }
        }
    }

    /// Runs the image flow. Flow failures end here: they are logged and the user gets an apology.
    async fn handle_image_prompt(&self, chat: &Chat, text: &str) -> Result<()> {
        let prompt = strip_sentinel(text);
        if prompt.is_empty() {
            self.bot.send_message(chat, MSG_EMPTY_PROMPT).await?;
            return Ok(());
        }

        info!(
            chat_id = chat.id,
            prompt_preview = %prompt.chars().take(50).collect::<String>(),
            "step: image generation requested"
        );

        match self.images.run(chat, prompt).await {
            Ok(ImageFlowOutcome::Delivered) => {
                self.usage.record(chat.id, UsageAction::ImageRequest).await;
            }
            Ok(ImageFlowOutcome::TimedOut { attempts }) => {
                warn!(chat_id = chat.id, attempts, "Image generation timed out");
                self.bot.send_message(chat, MSG_GENERATION_TIMEOUT).await?;
            }
            Err(e) => {
                error!(chat_id = chat.id, error = %format!("{:#}", e), "Image generation failed");
                self.bot.send_message(chat, MSG_GENERATION_FAILED).await?;
            }
        }
        Ok(())
    }

    async fn handle_wiki_query(&self, chat: &Chat, text: &str) -> Result<()> {
        let summary = self.wiki.lookup(text).await;
        self.bot.send_message(chat, &summary).await?;
        self.usage.record(chat.id, UsageAction::WikiRequest).await;
        Ok(())
    }
}

#[async_trait]
impl Handler for MenuDispatcher {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let slot = self.states.slot(message.chat.id).await;
        let mut state = slot.lock().await;
        let current = *state;

        match self.step(current, message).await {
            Ok(next) => {
                if next != current {
                    info!(chat_id = message.chat.id, from = ?current, to = ?next, "step: dialog state changed");
                }
                *state = next;
                Ok(HandlerResponse::Stop)
            }
            Err(e) => {
                *state = DialogState::Idle;
                Err(e)
            }
        }
    }
}
