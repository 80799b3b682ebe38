//! # dbot-telegram
//!
//! Telegram layer: teloxide adapters, [`dbot_core::Bot`] implementation, connection config, REPL runner.
//! Handles only Telegram connectivity and handler-chain execution; dialog logic lives in `dialog-handlers`.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::run_repl;
