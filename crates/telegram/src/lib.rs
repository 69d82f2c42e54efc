use async_trait::async_trait;
use teloxide::prelude::Requester;
use teloxide::types::ChatId;
use teloxide::Bot;
use tracing::warn;

use common::Notifier;

/// Outbound Telegram notification sink.
///
/// Sends every message to all configured chats. Strictly best-effort:
/// a delivery failure is logged and never reaches the trading core.
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_ids: &[i64]) -> Self {
        Self {
            bot: Bot::new(token.into()),
            chat_ids: chat_ids.iter().map(|&id| ChatId(id)).collect(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) {
        for &chat_id in &self.chat_ids {
            if let Err(e) = self.bot.send_message(chat_id, text).await {
                warn!(chat_id = ?chat_id, error = %e, "Failed to send Telegram message");
            }
        }
    }
}
