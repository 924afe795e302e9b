//! In-memory fakes for the platform and provider seams.

use crate::core::error::BotError;
use crate::generator::ImageRef;
use crate::platform::{ChatId, Controls, MessageId, Messenger, SentMessage};
use crate::providers::{ImagePayload, ImageProvider};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendText(ChatId, String),
    SendImage(ChatId, ImageRef, Controls),
    Delete(ChatId, MessageId),
    UpdateControls(ChatId, MessageId, Controls),
    ResolveFile(String),
    Acknowledge(String),
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    fail_delete: bool,
    fail_send_image: bool,
    fail_resolve: bool,
    fail_acknowledge: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn failing_send_image(mut self) -> Self {
        self.fail_send_image = true;
        self
    }

    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    pub fn failing_acknowledge(mut self) -> Self {
        self.fail_acknowledge = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, BotError> {
        self.record(Call::SendText(chat_id, text.to_string()));
        Ok(self.next_message_id())
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: &ImageRef,
        controls: &Controls,
    ) -> Result<SentMessage, BotError> {
        self.record(Call::SendImage(chat_id, image.clone(), controls.clone()));
        if self.fail_send_image {
            return Err(BotError::Telegram("sendPhoto: wrong file identifier".into()));
        }
        let message_id = self.next_message_id();
        Ok(SentMessage {
            message_id,
            file_ref: Some(format!("file-{}", message_id.0)),
        })
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), BotError> {
        self.record(Call::Delete(chat_id, message_id));
        if self.fail_delete {
            return Err(BotError::Telegram(
                "deleteMessage: message to delete not found".into(),
            ));
        }
        Ok(())
    }

    async fn update_controls(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        controls: &Controls,
    ) -> Result<(), BotError> {
        self.record(Call::UpdateControls(chat_id, message_id, controls.clone()));
        Ok(())
    }

    async fn resolve_file_url(&self, file_ref: &str) -> Result<String, BotError> {
        self.record(Call::ResolveFile(file_ref.to_string()));
        if self.fail_resolve {
            return Err(BotError::Network("getFile timed out".into()));
        }
        Ok(format!("https://files.example/{}", file_ref))
    }

    async fn acknowledge_action(&self, action_id: &str) -> Result<(), BotError> {
        self.record(Call::Acknowledge(action_id.to_string()));
        if self.fail_acknowledge {
            return Err(BotError::Telegram("query is too old".into()));
        }
        Ok(())
    }
}

/// Provider that replays a fixed answer and remembers every prompt.
pub struct FakeProvider {
    answer: Box<dyn Fn() -> Result<ImagePayload, BotError> + Send + Sync>,
    pub requests: Mutex<Vec<(String, String, u32)>>,
}

impl FakeProvider {
    pub fn new(answer: impl Fn() -> Result<ImagePayload, BotError> + Send + Sync + 'static) -> Self {
        Self {
            answer: Box::new(answer),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn url(url: &'static str) -> Self {
        Self::new(move || {
            Ok(ImagePayload {
                url: Some(url.to_string()),
                b64_json: None,
            })
        })
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(move || Err(BotError::RateLimited(message.to_string())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _, _)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ImageProvider for FakeProvider {
    async fn generate_image(
        &self,
        prompt: &str,
        size: &str,
        count: u32,
    ) -> Result<ImagePayload, BotError> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), size.to_string(), count));
        (self.answer)()
    }
}
