use crate::core::error::BotError;
use crate::generator::ImageRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod telegram;
pub mod types;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// An interactive button attached to a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Callback { label: String, payload: String },
    Link { label: String, url: String },
}

impl Control {
    pub fn callback(label: &str, payload: impl Into<String>) -> Self {
        Control::Callback {
            label: label.to_string(),
            payload: payload.into(),
        }
    }

    pub fn link(label: &str, url: impl Into<String>) -> Self {
        Control::Link {
            label: label.to_string(),
            url: url.into(),
        }
    }
}

/// Rows of buttons, rendered top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub rows: Vec<Vec<Control>>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, controls: Vec<Control>) -> Self {
        self.rows.push(controls);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: MessageId,
    /// Platform handle of the hosted file, when the message carries one.
    pub file_ref: Option<String>,
}

/// Outbound operations against the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, BotError>;

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: &ImageRef,
        controls: &Controls,
    ) -> Result<SentMessage, BotError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
    -> Result<(), BotError>;

    async fn update_controls(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        controls: &Controls,
    ) -> Result<(), BotError>;

    async fn resolve_file_url(&self, file_ref: &str) -> Result<String, BotError>;

    async fn acknowledge_action(&self, action_id: &str) -> Result<(), BotError>;
}
