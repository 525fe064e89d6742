//! Telegram Bot API notifier.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::dispatcher::Notifier;
use crate::error::NotifyError;

/// Bot API settings, passed in explicitly at construction.
#[derive(Clone, Default)]
pub struct TelegramConfig {
    /// Bot API base URL.
    pub api_url: String,
    /// Bot token.
    pub bot_token: Option<String>,
    /// Target chat.
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Token and chat id, when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat = self.chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some((token, chat))
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Sends alerts through `sendMessage`.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    /// Create a notifier. Sends fail with `NotConfigured` without credentials.
    pub fn new(http: reqwest::Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let Some((token, chat_id)) = self.config.credentials() else {
            return Err(NotifyError::NotConfigured);
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            token
        );

        // Strip the URL from transport errors: it embeds the bot token.
        let response = self
            .http
            .get(&url)
            .query(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, chat: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: token.map(str::to_string),
            chat_id: chat.map(str::to_string),
        }
    }

    #[test]
    fn credentials_need_both_values() {
        assert!(config(None, None).credentials().is_none());
        assert!(config(Some("t"), None).credentials().is_none());
        assert!(config(None, Some("1")).credentials().is_none());
        assert!(config(Some(""), Some("1")).credentials().is_none());
        assert_eq!(config(Some("t"), Some("1")).credentials(), Some(("t", "1")));
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", config(Some("123:secret"), Some("42")));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("42"));
    }

    #[tokio::test]
    async fn unconfigured_notifier_refuses_to_send() {
        let notifier = TelegramNotifier::new(reqwest::Client::new(), config(None, Some("42")));
        assert!(!notifier.is_configured());

        let err = notifier.send("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }
}
