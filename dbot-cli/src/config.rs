//! BotConfig: Telegram connection + log file + image provider + encyclopedia settings. Loaded from env.

use anyhow::{Context, Result};
use dbot_telegram::TelegramConfig;
use image_generation_client::{
    ImageGenerationClient, DEFAULT_BASE_URL, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_ATTEMPTS,
};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use wiki_client::DEFAULT_LANG;

const DEFAULT_LOG_FILE: &str = "logs/dbot.log";
const DEFAULT_POLL_DELAY_SECS: u64 = 10;

/// Image provider settings.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// FUSIONBRAIN_API_KEY
    pub api_key: String,
    /// FUSIONBRAIN_SECRET_KEY
    pub secret_key: String,
    /// FUSIONBRAIN_API_URL
    pub api_url: String,
    /// IMAGE_POLL_ATTEMPTS
    pub poll_attempts: u32,
    /// IMAGE_POLL_DELAY_SECS
    pub poll_delay_secs: u64,
    /// IMAGE_WIDTH
    pub width: u32,
    /// IMAGE_HEIGHT
    pub height: u32,
    /// IMAGE_WORK_DIR: holds generated images until they are uploaded
    pub work_dir: PathBuf,
}

impl ImageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("FUSIONBRAIN_API_KEY").context("FUSIONBRAIN_API_KEY not set")?,
            secret_key: env::var("FUSIONBRAIN_SECRET_KEY")
                .context("FUSIONBRAIN_SECRET_KEY not set")?,
            api_url: env::var("FUSIONBRAIN_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            poll_attempts: env_or("IMAGE_POLL_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            poll_delay_secs: env_or("IMAGE_POLL_DELAY_SECS", DEFAULT_POLL_DELAY_SECS)?,
            width: env_or("IMAGE_WIDTH", DEFAULT_IMAGE_SIZE)?,
            height: env_or("IMAGE_HEIGHT", DEFAULT_IMAGE_SIZE)?,
            work_dir: env::var("IMAGE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.secret_key.trim().is_empty() {
            anyhow::bail!("FUSIONBRAIN_API_KEY and FUSIONBRAIN_SECRET_KEY must not be empty");
        }
        if reqwest::Url::parse(&self.api_url).is_err() {
            anyhow::bail!("FUSIONBRAIN_API_URL is not a valid URL: {}", self.api_url);
        }
        if self.poll_attempts == 0 {
            anyhow::bail!("IMAGE_POLL_ATTEMPTS must be at least 1");
        }
        if self.width == 0 || self.height == 0 {
            anyhow::bail!(
                "IMAGE_WIDTH and IMAGE_HEIGHT must be positive (got {}x{})",
                self.width,
                self.height
            );
        }
        Ok(())
    }

    pub fn build_client(&self) -> ImageGenerationClient {
        ImageGenerationClient::new(self.api_key.clone(), self.secret_key.clone())
            .with_base_url(self.api_url.clone())
            .with_size(self.width, self.height)
            .with_poll(self.poll_attempts, Duration::from_secs(self.poll_delay_secs))
    }
}

/// Full bot config. Use BotConfig::load() then validate() before init.
pub struct BotConfig {
    pub telegram: TelegramConfig,
    /// LOG_FILE
    pub log_file: String,
    pub image: ImageConfig,
    /// WIKI_LANG: Wikipedia language edition
    pub wiki_lang: String,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::load(token)?;
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let image = ImageConfig::from_env()?;
        let wiki_lang = env::var("WIKI_LANG").unwrap_or_else(|_| DEFAULT_LANG.to_string());
        Ok(Self {
            telegram,
            log_file,
            image,
            wiki_lang,
        })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.telegram.validate()?;
        self.image.validate()?;
        if self.wiki_lang.is_empty()
            || !self
                .wiki_lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            anyhow::bail!("WIKI_LANG is not a language code: {:?}", self.wiki_lang);
        }
        Ok(())
    }

    pub fn bot_token(&self) -> &str {
        &self.telegram.bot_token
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.telegram.telegram_api_url.as_deref()
    }
    pub fn log_file(&self) -> &str {
        &self.log_file
    }
    pub fn image(&self) -> &ImageConfig {
        &self.image
    }
    pub fn image_work_dir(&self) -> &Path {
        &self.image.work_dir
    }
    pub fn wiki_lang(&self) -> &str {
        &self.wiki_lang
    }
}

/// Reads `name` and parses it, or returns `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const OPTIONAL_VARS: &[&str] = &[
        "TELEGRAM_API_URL",
        "TELOXIDE_API_URL",
        "LOG_FILE",
        "FUSIONBRAIN_API_URL",
        "IMAGE_POLL_ATTEMPTS",
        "IMAGE_POLL_DELAY_SECS",
        "IMAGE_WIDTH",
        "IMAGE_HEIGHT",
        "IMAGE_WORK_DIR",
        "WIKI_LANG",
    ];

    fn set_required() {
        for name in OPTIONAL_VARS {
            env::remove_var(name);
        }
        env::set_var("BOT_TOKEN", "test_token");
        env::set_var("FUSIONBRAIN_API_KEY", "test_api_key");
        env::set_var("FUSIONBRAIN_SECRET_KEY", "test_secret_key");
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        set_required();

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token(), "test_token");
        assert!(config.telegram_api_url().is_none());
        assert_eq!(config.log_file(), "logs/dbot.log");
        assert_eq!(config.image().api_url, "https://api-key.fusionbrain.ai/");
        assert_eq!(config.image().poll_attempts, 10);
        assert_eq!(config.image().poll_delay_secs, 10);
        assert_eq!((config.image().width, config.image().height), (1024, 1024));
        assert_eq!(config.image_work_dir(), Path::new("."));
        assert_eq!(config.wiki_lang(), "ru");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        set_required();
        env::set_var("LOG_FILE", "/tmp/dbot-test.log");
        env::set_var("FUSIONBRAIN_API_URL", "http://localhost:9000/");
        env::set_var("IMAGE_POLL_ATTEMPTS", "3");
        env::set_var("IMAGE_POLL_DELAY_SECS", "1");
        env::set_var("IMAGE_WIDTH", "512");
        env::set_var("IMAGE_HEIGHT", "768");
        env::set_var("IMAGE_WORK_DIR", "/tmp/dbot-images");
        env::set_var("WIKI_LANG", "en");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.log_file(), "/tmp/dbot-test.log");
        assert_eq!(config.image().poll_attempts, 3);
        assert_eq!(config.image().poll_delay_secs, 1);
        assert_eq!((config.image().width, config.image().height), (512, 768));
        assert_eq!(config.image_work_dir(), Path::new("/tmp/dbot-images"));
        assert_eq!(config.wiki_lang(), "en");

        let client = config.image().build_client();
        assert_eq!(client.base_url(), "http://localhost:9000/");

        for name in OPTIONAL_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_load_config_with_override_token() {
        set_required();

        let config = BotConfig::load(Some("override_token".to_string())).unwrap();

        assert_eq!(config.bot_token(), "override_token");
    }

    #[test]
    #[serial]
    fn test_missing_provider_key_fails() {
        set_required();
        env::remove_var("FUSIONBRAIN_SECRET_KEY");

        assert!(BotConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn test_non_numeric_poll_attempts_fails() {
        set_required();
        env::set_var("IMAGE_POLL_ATTEMPTS", "ten");

        assert!(BotConfig::load(None).is_err());

        env::remove_var("IMAGE_POLL_ATTEMPTS");
    }

    #[test]
    #[serial]
    fn test_validate_rejects_zero_values() {
        set_required();
        env::set_var("IMAGE_POLL_ATTEMPTS", "0");
        let config = BotConfig::load(None).unwrap();
        assert!(config.validate().is_err());

        env::set_var("IMAGE_POLL_ATTEMPTS", "2");
        env::set_var("IMAGE_WIDTH", "0");
        let config = BotConfig::load(None).unwrap();
        assert!(config.validate().is_err());

        env::remove_var("IMAGE_POLL_ATTEMPTS");
        env::remove_var("IMAGE_WIDTH");
    }

    #[test]
    #[serial]
    fn test_validate_telegram_api_url_invalid() {
        set_required();
        env::set_var("TELEGRAM_API_URL", "not-a-valid-url");

        let config = BotConfig::load(None).unwrap();
        assert!(config.validate().is_err());

        env::remove_var("TELEGRAM_API_URL");
    }

    #[test]
    #[serial]
    fn test_validate_provider_url_invalid() {
        set_required();
        env::set_var("FUSIONBRAIN_API_URL", "::nope::");

        let config = BotConfig::load(None).unwrap();
        assert!(config.validate().is_err());

        env::remove_var("FUSIONBRAIN_API_URL");
    }
}
