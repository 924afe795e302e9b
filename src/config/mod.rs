use crate::core::error::BotError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

fn default_poll_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_base: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: None,
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
}

impl ProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn size(&self) -> &str {
        self.size.as_deref().unwrap_or(DEFAULT_IMAGE_SIZE)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

/// Both secrets the process needs before it can serve anything.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub openai_api_key: String,
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join(".pixbot").join("config.yaml")
    }

    /// Loads the YAML config. The default location may be absent; an
    /// explicitly requested path may not.
    pub fn load(path: Option<&Path>) -> Result<Config, BotError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(BotError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents)
            .map_err(|e| BotError::Config(format!("Parse {}: {}", path.display(), e.detail())))
    }

    pub fn parse(contents: &str) -> Result<Config, BotError> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yml::from_str::<Config>(contents)?)
    }

    /// Environment variables win over the file.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.openai.base_url = Some(base.trim_end_matches('/').to_string());
        }
        if let Some(model) = lookup("OPENAI_IMAGE_MODEL") {
            self.openai.model = Some(model);
        }
    }

    pub fn telegram_api_base(&self) -> &str {
        self.telegram
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_TELEGRAM_API_BASE)
    }

    pub fn credentials(&self) -> Result<Credentials, BotError> {
        let bot_token = non_blank(&self.telegram.bot_token).ok_or_else(|| {
            BotError::Config(
                "TELEGRAM_BOT_TOKEN is missing. Set it in environment, .env or config file"
                    .to_string(),
            )
        })?;
        let openai_api_key = non_blank(&self.openai.api_key).ok_or_else(|| {
            BotError::Config(
                "OPENAI_API_KEY is missing. Set it in environment, .env or config file"
                    .to_string(),
            )
        })?;

        Ok(Credentials {
            bot_token,
            openai_api_key,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
