//! Telegram connection config: token and optional Bot API URL.
//! Loaded from BOT_TOKEN and TELEGRAM_API_URL (or TELOXIDE_API_URL).

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// Loads from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        Ok(Self {
            bot_token,
            telegram_api_url,
        })
    }

    /// Builds with the given token and the default Bot API URL.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
        }
    }

    /// Fails if the token is blank or the API URL is set but not a valid URL.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }

    /// Creates the teloxide Bot, pointed at the custom API URL when one is configured.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match self.telegram_api_url {
            Some(ref url_str) => {
                let url = reqwest::Url::parse(url_str)
                    .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", url_str))?;
                Ok(bot.set_api_url(url))
            }
            None => Ok(bot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.telegram_api_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_prefers_override_token() {
        env::set_var("BOT_TOKEN", "env_token");
        env::remove_var("TELEGRAM_API_URL");
        env::set_var("TELOXIDE_API_URL", "http://localhost:8081");

        let config = TelegramConfig::load(Some("override_token".to_string())).unwrap();

        assert_eq!(config.bot_token, "override_token");
        assert_eq!(config.telegram_api_url.as_deref(), Some("http://localhost:8081"));

        env::remove_var("TELOXIDE_API_URL");
    }

    #[test]
    #[serial]
    fn test_load_without_token_fails() {
        env::remove_var("BOT_TOKEN");
        assert!(TelegramConfig::load(None).is_err());
    }

    #[test]
    fn test_validate_rejects_invalid_url() {
        let config = TelegramConfig {
            bot_token: "t".to_string(),
            telegram_api_url: Some("not-a-valid-url".to_string()),
        };
        assert!(config.validate().is_err());
        assert!(config.build_bot().is_err());
    }

    #[test]
    fn test_build_bot_with_custom_url() {
        let config = TelegramConfig {
            bot_token: "123:test".to_string(),
            telegram_api_url: Some("http://localhost:8081/".to_string()),
        };
        let bot = config.build_bot().unwrap();
        assert_eq!(bot.api_url().as_str(), "http://localhost:8081/");
    }
}
