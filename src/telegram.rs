//! Outbound notifications via the Telegram Bot API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::BotError;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends plain-text messages to one fixed chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        let client = match reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    "Failed to build Telegram HTTP client with timeouts, falling back to defaults: {}",
                    e
                );
                reqwest::Client::new()
            }
        };

        Self {
            client,
            token,
            chat_id,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    /// Sends one message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), BotError> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            // without_url: the request URL embeds the bot token
            .map_err(|e| self.delivery_error(e.without_url().to_string()))?;

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();
        check_delivery(status, &body_text).map_err(|reason| self.delivery_error(reason))
    }

    /// Sends a message and degrades a delivery failure to a log line.
    ///
    /// A failed notification must never take the poll loop down with it.
    pub async fn notify_best_effort(&self, text: &str) {
        match self.send_message(text).await {
            Ok(()) => info!("Notification delivered to chat {}", self.chat_id),
            Err(e) => error!("Dropping undeliverable notification: {}", e),
        }
    }

    fn delivery_error(&self, reason: String) -> BotError {
        BotError::Delivery {
            chat_id: self.chat_id.clone(),
            reason,
        }
    }
}

/// Validates a Telegram API response.
///
/// The API reports failures both through HTTP status codes and through the
/// `ok`/`description` envelope in an HTTP 200 body; both paths must fail the
/// delivery.
fn check_delivery(status: StatusCode, body: &str) -> Result<(), String> {
    let parsed = serde_json::from_str::<Value>(body).ok();

    if !status.is_success() {
        let description = parsed
            .as_ref()
            .and_then(|data| data.get("description"))
            .and_then(Value::as_str)
            .unwrap_or(body);
        return Err(format!("status={status}, description={description}"));
    }

    let Some(data) = parsed else {
        return Err(format!("could not parse API response: {body}"));
    };

    let ok = data.get("ok").and_then(Value::as_bool).unwrap_or(true);
    if !ok {
        let description = data
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("no description");
        return Err(format!("ok=false, description={description}"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_envelope_passes() {
        let outcome = check_delivery(StatusCode::OK, r#"{"ok":true,"result":{}}"#);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_http_failure_carries_description() {
        let outcome = check_delivery(
            StatusCode::FORBIDDEN,
            r#"{"ok":false,"description":"bot was blocked by the user"}"#,
        );
        let reason = outcome.unwrap_err();
        assert!(reason.contains("403"));
        assert!(reason.contains("bot was blocked by the user"));
    }

    #[test]
    fn test_ok_false_in_success_body_fails() {
        let outcome = check_delivery(
            StatusCode::OK,
            r#"{"ok":false,"description":"chat not found"}"#,
        );
        assert!(outcome.unwrap_err().contains("chat not found"));
    }

    #[test]
    fn test_unparseable_success_body_fails() {
        let outcome = check_delivery(StatusCode::OK, "<html>gateway</html>");
        assert!(outcome.is_err());
    }
}
