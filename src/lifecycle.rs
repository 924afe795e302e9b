use crate::platform::{Messenger, UserId};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// Keeps at most one bot output visible per user.
pub struct MessageLifecycle {
    sessions: Arc<SessionStore>,
    messenger: Arc<dyn Messenger>,
}

impl MessageLifecycle {
    pub fn new(sessions: Arc<SessionStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            sessions,
            messenger,
        }
    }

    /// Best effort: a failed delete is logged and forgotten.
    pub async fn retire_last(&self, user_id: UserId) {
        let (Some(chat_id), Some(message_id)) = (
            self.sessions.get_chat(user_id),
            self.sessions.get_last_message(user_id),
        ) else {
            return;
        };

        if let Err(e) = self.messenger.delete_message(chat_id, message_id).await {
            debug!(
                user = user_id.0,
                message = message_id.0,
                "Could not delete previous message: {}",
                e
            );
        }
    }
}
