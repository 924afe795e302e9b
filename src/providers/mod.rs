use crate::core::error::BotError;
use async_trait::async_trait;

/// Raw answer of a text-to-image endpoint. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePayload {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        size: &str,
        count: u32,
    ) -> Result<ImagePayload, BotError>;
}

pub mod base_client;
pub mod openai;
