use crate::core::error::BotError;
use crate::correlator::{self, REGEN};
use crate::generator::{GenerationResult, ImageGenerator, ImageRef};
use crate::language;
use crate::lifecycle::MessageLifecycle;
use crate::platform::{ChatId, Control, Controls, Messenger, SentMessage, UserId};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DOWNLOAD_LABEL: &str = "⬇️ Download";
pub const ASK_FOR_PROMPT: &str =
    "✍️ দয়া করে একটি স্ক্রিপ্ট লিখুন (বাংলা বা ইংরেজি) — আমি সেটি থেকে একটি ছবি বানিয়ে দেব।";

/// Both buttons replay the same prompt.
const REGEN_LABELS: [&str; 2] = ["ENTIRE", "GO"];

fn regen_controls(prompt: &str) -> Controls {
    let payload = correlator::encode(REGEN, prompt);
    REGEN_LABELS.iter().fold(Controls::new(), |controls, label| {
        controls.row(vec![Control::callback(label, payload.clone())])
    })
}

/// Drives both entry flows: a fresh prompt and a regenerate tap.
///
/// Each flow runs retire, generate, send, enrich in that order. Flows for
/// the same user are not serialized; the last send to finish owns the
/// session's `last_message_id`.
pub struct Orchestrator {
    sessions: Arc<SessionStore>,
    messenger: Arc<dyn Messenger>,
    generator: ImageGenerator,
    lifecycle: MessageLifecycle,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        messenger: Arc<dyn Messenger>,
        generator: ImageGenerator,
    ) -> Self {
        let lifecycle = MessageLifecycle::new(sessions.clone(), messenger.clone());
        Self {
            sessions,
            messenger,
            generator,
            lifecycle,
        }
    }

    pub async fn on_start(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        display_name: &str,
    ) -> Result<(), BotError> {
        let session = self.sessions.get_or_create(user_id);
        debug!(
            user = session.user_id.0,
            tracked = session.last_message_id.is_some(),
            "start requested"
        );
        self.messenger
            .send_text(chat_id, &format!("👋 Welcome {}!", display_name))
            .await?;
        self.messenger.send_text(chat_id, ASK_FOR_PROMPT).await?;
        Ok(())
    }

    pub async fn on_text_message(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), BotError> {
        let prompt = text.trim();
        self.sessions.set_chat(user_id, chat_id);
        self.lifecycle.retire_last(user_id).await;
        self.respond(user_id, chat_id, prompt).await
    }

    pub async fn on_regenerate_action(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        payload: &str,
        action_id: &str,
    ) -> Result<(), BotError> {
        if let Err(e) = self.messenger.acknowledge_action(action_id).await {
            debug!(action = action_id, "Could not acknowledge action: {}", e);
        }

        let (_, prompt) = correlator::decode(payload);
        self.sessions.set_chat(user_id, chat_id);
        self.lifecycle.retire_last(user_id).await;
        self.respond(user_id, chat_id, &prompt).await
    }

    async fn respond(&self, user_id: UserId, chat_id: ChatId, prompt: &str) -> Result<(), BotError> {
        let reason = match self.generator.generate(prompt).await {
            GenerationResult::Success(image) => {
                let sent = self
                    .messenger
                    .send_image(chat_id, &image, &regen_controls(prompt))
                    .await;
                discard_local_file(&image).await;

                match sent {
                    Ok(sent) => {
                        self.sessions.set_last_message(user_id, sent.message_id);
                        info!(user = user_id.0, message = sent.message_id.0, "image delivered");
                        self.attach_download(chat_id, &sent, prompt).await;
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(user = user_id.0, "sending image failed: {}", e);
                        e.detail()
                    }
                }
            }
            GenerationResult::Failure(failure) => {
                warn!(
                    user = user_id.0,
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    "generation failed"
                );
                failure.reason
            }
        };

        let notice = language::detect(prompt).error_notice(&reason);
        let message_id = self.messenger.send_text(chat_id, &notice).await?;
        self.sessions.set_last_message(user_id, message_id);
        Ok(())
    }

    /// Adds a download link once the platform hosts the file. Best effort.
    async fn attach_download(&self, chat_id: ChatId, sent: &SentMessage, prompt: &str) {
        let Some(file_ref) = sent.file_ref.as_deref() else {
            return;
        };

        let result: Result<(), BotError> = async {
            let url = self.messenger.resolve_file_url(file_ref).await?;
            let controls = regen_controls(prompt).row(vec![Control::link(DOWNLOAD_LABEL, url)]);
            self.messenger
                .update_controls(chat_id, sent.message_id, &controls)
                .await
        }
        .await;

        if let Err(e) = result {
            debug!(message = sent.message_id.0, "Failed to attach download button: {}", e);
        }
    }
}

async fn discard_local_file(image: &ImageRef) {
    if let ImageRef::LocalFile(path) = image {
        if let Err(e) = tokio::fs::remove_file(path).await {
            debug!(path = %path.display(), "Could not remove temp image: {}", e);
        }
    }
}
