use super::types::{ApiResponse, File, InlineKeyboardMarkup, Message, Update};
use super::{ChatId, Controls, MessageId, Messenger, SentMessage};
use crate::core::error::BotError;
use crate::generator::ImageRef;
use crate::providers::base_client::BaseApiClient;
use async_trait::async_trait;
use reqwest::Response;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Value, json};

/// Telegram Bot API over plain HTTPS.
#[derive(Clone)]
pub struct TelegramClient {
    client: BaseApiClient,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: String) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self {
            client: BaseApiClient::new(format!("{}/bot{}", api_base, token), None),
            api_base,
            token,
        }
    }

    async fn read<T: DeserializeOwned>(method: &str, response: Response) -> Result<T, BotError> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            BotError::Serialization(format!("{} (HTTP {}): {}", method, status.as_u16(), e))
        })?;

        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Telegram(format!(
                "{}: {}",
                method,
                parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            ))),
        }
    }

    async fn call<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        method: &str,
        payload: &P,
    ) -> Result<T, BotError> {
        let response = self.client.send_request(method, payload).await?;
        Self::read(method, response).await
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }
}

fn sent_message(message: Message) -> SentMessage {
    SentMessage {
        message_id: message.message_id,
        file_ref: message.largest_photo().map(|p| p.file_id.clone()),
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, BotError> {
        let message: Message = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(message.message_id)
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: &ImageRef,
        controls: &Controls,
    ) -> Result<SentMessage, BotError> {
        let markup = InlineKeyboardMarkup::from(controls);

        let message: Message = match image {
            ImageRef::Remote(url) => {
                self.call(
                    "sendPhoto",
                    &json!({ "chat_id": chat_id, "photo": url, "reply_markup": markup }),
                )
                .await?
            }
            ImageRef::LocalFile(path) => {
                let bytes = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image.png".to_string());
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("image/png")?;
                let form = Form::new()
                    .text("chat_id", chat_id.0.to_string())
                    .text("reply_markup", serde_json::to_string(&markup)?)
                    .part("photo", part);
                let response = self.client.send_multipart("sendPhoto", form).await?;
                Self::read("sendPhoto", response).await?
            }
        };

        Ok(sent_message(message))
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), BotError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn update_controls(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        controls: &Controls,
    ) -> Result<(), BotError> {
        // Answers with the edited message, or `true` for inline messages.
        let _: Value = self
            .call(
                "editMessageReplyMarkup",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "reply_markup": InlineKeyboardMarkup::from(controls),
                }),
            )
            .await?;
        Ok(())
    }

    async fn resolve_file_url(&self, file_ref: &str) -> Result<String, BotError> {
        let file: File = self
            .call("getFile", &json!({ "file_id": file_ref }))
            .await?;
        let path = file
            .file_path
            .ok_or_else(|| BotError::Telegram("getFile: no file_path returned".to_string()))?;
        Ok(self.file_url(&path))
    }

    async fn acknowledge_action(&self, action_id: &str) -> Result<(), BotError> {
        let _: bool = self
            .call("answerCallbackQuery", &json!({ "callback_query_id": action_id }))
            .await?;
        Ok(())
    }
}
