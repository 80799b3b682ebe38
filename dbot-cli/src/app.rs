//! Wiring: builds the bot, clients and handler chain from BotConfig and runs the REPL.

use anyhow::{Context, Result};
use dbot_core::{init_tracing, Bot};
use dbot_telegram::{run_repl, TelegramBotAdapter};
use dialog_handlers::{ImageGenerationFlow, LoggingHandler, MenuDispatcher, UsageStore};
use handler_chain::HandlerChain;
use image_generation_client::mask_secret;
use std::sync::Arc;
use tracing::info;
use wiki_client::WikiClient;

use crate::config::BotConfig;

/// Initializes logging, wires components and polls Telegram until stopped.
pub async fn run_bot(config: BotConfig) -> Result<()> {
    init_tracing(config.log_file())?;
    info!(
        log_file = %config.log_file(),
        image_api_url = %config.image().api_url,
        image_api_key = %mask_secret(&config.image().api_key),
        wiki_lang = %config.wiki_lang(),
        "Starting dbot"
    );

    let teloxide_bot = config.telegram.build_bot()?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    let work_dir = config.image_work_dir().to_path_buf();
    tokio::fs::create_dir_all(&work_dir)
        .await
        .with_context(|| format!("create image work dir {}", work_dir.display()))?;

    let images = ImageGenerationFlow::new(
        Arc::new(config.image().build_client()),
        bot.clone(),
        work_dir,
    );
    let wiki = Arc::new(WikiClient::new(config.wiki_lang()));
    let dispatcher = MenuDispatcher::new(bot, images, wiki, UsageStore::new());

    let chain = HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(dispatcher));

    info!(handlers = chain.len(), "Handler chain ready, starting polling");
    run_repl(teloxide_bot, chain).await
}
