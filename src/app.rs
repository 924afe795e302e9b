use crate::core::error::BotError;
use crate::correlator;
use crate::orchestrator::Orchestrator;
use crate::platform::telegram::TelegramClient;
use crate::platform::types::Update;
use crate::platform::{ChatId, Messenger, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const RETRY_PAUSE: Duration = Duration::from_secs(3);

/// What an incoming update asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start {
        user_id: UserId,
        chat_id: ChatId,
        display_name: String,
    },
    Prompt {
        user_id: UserId,
        chat_id: ChatId,
        text: String,
    },
    Regenerate {
        user_id: UserId,
        chat_id: ChatId,
        payload: String,
        action_id: String,
    },
    /// A button press the bot does not handle; still needs an answer.
    UnknownAction { action_id: String },
}

/// Maps an update onto an event. Commands other than `/start`, non-text
/// messages and updates without a sender are dropped.
pub fn route(update: &Update) -> Option<Event> {
    if let Some(message) = &update.message {
        let user = message.from.as_ref()?;
        let text = message.text.as_deref()?;
        let chat_id = message.chat.id;

        if let Some(command) = text.strip_prefix('/') {
            let name = command.split_whitespace().next().unwrap_or_default();
            let name = name.split('@').next().unwrap_or_default();
            return (name == "start").then(|| Event::Start {
                user_id: user.id,
                chat_id,
                display_name: user.first_name.clone(),
            });
        }

        return Some(Event::Prompt {
            user_id: user.id,
            chat_id,
            text: text.to_string(),
        });
    }

    let query = update.callback_query.as_ref()?;
    let data = query.data.as_deref().unwrap_or_default();
    match &query.message {
        Some(message) if correlator::is_regen(data) => Some(Event::Regenerate {
            user_id: query.from.id,
            chat_id: message.chat.id,
            payload: data.to_string(),
            action_id: query.id.clone(),
        }),
        _ => Some(Event::UnknownAction {
            action_id: query.id.clone(),
        }),
    }
}

/// Waits out `pause`. Returns true if `shutdown` completed first.
async fn interrupted<S: Future + Unpin>(shutdown: &mut S, pause: Duration) -> bool {
    tokio::select! {
        _ = shutdown => true,
        _ = tokio::time::sleep(pause) => false,
    }
}

pub struct Application {
    telegram: Arc<TelegramClient>,
    orchestrator: Arc<Orchestrator>,
    poll_timeout_secs: u64,
}

impl Application {
    pub fn new(
        telegram: Arc<TelegramClient>,
        orchestrator: Arc<Orchestrator>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            telegram,
            orchestrator,
            poll_timeout_secs,
        }
    }

    /// Long-polls until Ctrl-C. Every update runs on its own task.
    pub async fn run(&self) -> Result<(), BotError> {
        info!("Bot started...");
        let mut offset = 0;

        // One listener for the whole run, so a signal that lands between
        // polls is still seen.
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let updates = tokio::select! {
                _ = &mut shutdown => {
                    info!("Bot stopped.");
                    return Ok(());
                }
                res = self.telegram.get_updates(offset, self.poll_timeout_secs) => res,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Polling for updates failed: {}", e);
                    if interrupted(&mut shutdown, RETRY_PAUSE).await {
                        info!("Bot stopped.");
                        return Ok(());
                    }
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                match route(&update) {
                    Some(event) => self.dispatch(event),
                    None => debug!(update = update.update_id, "ignoring update"),
                }
            }
        }
    }

    fn dispatch(&self, event: Event) {
        let orchestrator = self.orchestrator.clone();
        let telegram = self.telegram.clone();

        tokio::spawn(async move {
            let result = match event {
                Event::Start {
                    user_id,
                    chat_id,
                    display_name,
                } => orchestrator.on_start(user_id, chat_id, &display_name).await,
                Event::Prompt {
                    user_id,
                    chat_id,
                    text,
                } => orchestrator.on_text_message(user_id, chat_id, &text).await,
                Event::Regenerate {
                    user_id,
                    chat_id,
                    payload,
                    action_id,
                } => {
                    orchestrator
                        .on_regenerate_action(user_id, chat_id, &payload, &action_id)
                        .await
                }
                Event::UnknownAction { action_id } => {
                    telegram.acknowledge_action(&action_id).await
                }
            };

            if let Err(e) = result {
                error!("Handling update failed: {}", e);
            }
        });
    }
}
