//! REPL runner: converts each teloxide message to a core Message and hands it to the HandlerChain.
//!
//! teloxide delivers updates of one chat sequentially and different chats concurrently, so the
//! chain is awaited inline; a slow turn delays only its own chat.

use anyhow::Result;
use dbot_core::{Message, ToCoreMessage};
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use tracing::{debug, error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Text messages are logged by the chain's logging handler; only other updates are noted here.
fn log_non_text(message: &Message) {
    if message.message_type != "text" {
        debug!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_type = %message.message_type,
            "Received non-text message"
        );
    }
}

/// Starts long polling with the given teloxide Bot and HandlerChain. Returns when the bot is stopped.
///
/// Chain errors are logged and never stop the loop.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(username = ?me.user.username, "Connected to Telegram"),
        Err(e) => error!(error = %e, "get_me failed; continuing with polling"),
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();

            log_non_text(&core_msg);

            if let Err(e) = chain.handle(&core_msg).await {
                error!(
                    error = %e,
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    "Handler chain failed"
                );
            }

            Ok(())
        }
    })
    .await;

    Ok(())
}
