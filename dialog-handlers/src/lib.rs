//! # dialog-handlers
//!
//! Conversation logic of the bot: [`MenuDispatcher`] drives a small per-chat state machine
//! (menu → prompt → action), [`ImageGenerationFlow`] runs the text-to-image pipeline,
//! [`UsageStore`] counts successful actions per user.

mod dispatcher;
mod image_flow;
mod logging;
pub mod menu;
mod state;
mod usage;

pub use dispatcher::MenuDispatcher;
pub use image_flow::{ImageFlowOutcome, ImageGenerationFlow};
pub use logging::LoggingHandler;
pub use menu::MenuCommand;
pub use state::{DialogState, DialogStateStore};
pub use usage::{UsageAction, UsageRecord, UsageStore};
