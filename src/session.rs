use crate::platform::{ChatId, MessageId, UserId};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: UserId,
    pub chat_id: Option<ChatId>,
    pub last_message_id: Option<MessageId>,
}

impl UserSession {
    fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            chat_id: None,
            last_message_id: None,
        }
    }
}

/// Per-user conversation state for the lifetime of the process.
///
/// Entries are created lazily and never removed. Each setter touches a
/// single field, so concurrent flows for the same user resolve last-wins.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, UserSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, user_id: UserId) -> UserSession {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| UserSession::new(user_id))
            .clone()
    }

    pub fn set_chat(&self, user_id: UserId, chat_id: ChatId) {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| UserSession::new(user_id))
            .chat_id = Some(chat_id);
    }

    pub fn set_last_message(&self, user_id: UserId, message_id: MessageId) {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| UserSession::new(user_id))
            .last_message_id = Some(message_id);
    }

    pub fn get_last_message(&self, user_id: UserId) -> Option<MessageId> {
        self.sessions.get(&user_id)?.last_message_id
    }

    pub fn get_chat(&self, user_id: UserId) -> Option<ChatId> {
        self.sessions.get(&user_id)?.chat_id
    }
}
