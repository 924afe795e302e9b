use std::io;
use thiserror::Error;

/// Unified error type for the bot
#[derive(Error, Debug)]
pub enum BotError {
    /// Missing or invalid configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider or platform answered with an error body
    #[error("API error: {0}")]
    Api(String),

    /// Provider answered with HTTP 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Telegram Bot API answered with `ok: false`
    #[error("Telegram error: {0}")]
    Telegram(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Inline image payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Unknown or unexpected errors
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl BotError {
    /// The upstream message without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            BotError::Config(msg)
            | BotError::Api(msg)
            | BotError::RateLimited(msg)
            | BotError::Telegram(msg)
            | BotError::Serialization(msg)
            | BotError::Decode(msg)
            | BotError::Network(msg)
            | BotError::Unknown(msg) => msg.clone(),
            BotError::Io { source } => source.to_string(),
        }
    }
}

/// Closed classification of generation failures, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    MalformedResponse,
    Transport,
    Decode,
    Upstream,
}

impl From<&BotError> for FailureKind {
    fn from(err: &BotError) -> Self {
        match err {
            BotError::RateLimited(_) => FailureKind::Quota,
            BotError::Serialization(_) => FailureKind::MalformedResponse,
            BotError::Network(_) => FailureKind::Transport,
            BotError::Decode(_) | BotError::Io { .. } => FailureKind::Decode,
            _ => FailureKind::Upstream,
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            BotError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            BotError::Api(format!("API returned error status: {}", err))
        } else if err.is_decode() {
            BotError::Serialization(format!("Response body: {}", err))
        } else {
            BotError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for BotError {
    fn from(err: serde_yml::Error) -> Self {
        BotError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<base64::DecodeError> for BotError {
    fn from(err: base64::DecodeError) -> Self {
        BotError::Decode(format!("base64: {}", err))
    }
}
