//! # dbot-cli
//!
//! CLI parsing, env config loading and application wiring for the `dbot` binary.

pub mod app;
pub mod cli;
pub mod config;

pub use app::run_bot;
pub use cli::{load_config, Cli, Commands};
pub use config::{BotConfig, ImageConfig};
