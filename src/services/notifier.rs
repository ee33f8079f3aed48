//! Outbound notification channel

use async_trait::async_trait;
use serde_json::json;

use crate::{
    config::TelegramConfig,
    error::{AppError, AppResult},
};

/// Fire-and-forget message sink for loan and overdue notifications.
///
/// Implementations make no retry guarantees; callers decide whether a
/// failure is propagated or only logged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> AppResult<()>;
}

/// Notifier posting messages to a Telegram chat via the bot API
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> AppResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url, self.config.bot_token
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.config.chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("Failed to reach Telegram: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Notification(format!(
                "Telegram returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
