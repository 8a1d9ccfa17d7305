//! Telegram Bot API transport.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{compose_message, Notifier};
use crate::error::{RelayError, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends messages to one chat through `sendMessage`.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_root: String,
    bot_token: String,
    chat_id: String,
}

/// The envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        api_root: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_root, self.bot_token)
    }

    /// Send a pre-formatted MarkdownV2 message.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "MarkdownV2",
            }))
            .send()
            .await
            // reqwest embeds the URL, and with it the token, in its errors.
            .map_err(|e| RelayError::Delivery(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(RelayError::Delivery(format!(
                "HTTP {status}: {}",
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(RelayError::Delivery(format!("HTTP {status}: {body}"))),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn deliver(&self, title: &str, link: &str) -> Result<()> {
        self.send_message(&compose_message(title, link)).await?;
        info!(chat_id = %self.chat_id, "sent: {title}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:ABC";

    async fn mock_api(response: ResponseTemplate) -> (MockServer, TelegramNotifier) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .respond_with(response)
            .mount(&server)
            .await;
        let notifier = TelegramNotifier::new(server.uri(), TOKEN, "-100").unwrap();
        (server, notifier)
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let n = TelegramNotifier::new("https://api.telegram.org/", "123:ABC", "-100").unwrap();
        assert_eq!(n.endpoint(), "https://api.telegram.org/bot123:ABC/sendMessage");
    }

    #[test]
    fn api_envelope_parses() {
        let ok: ApiResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(ok.ok);

        let err: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
                .unwrap();
        assert!(!err.ok);
        assert_eq!(err.description.as_deref(), Some("Unauthorized"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_delivery_error_without_token() {
        let n = TelegramNotifier::new("http://127.0.0.1:1", "secret-token", "-100").unwrap();
        let err = n.deliver("title", "https://example.com").await.unwrap_err();

        assert!(matches!(err, RelayError::Delivery(_)));
        assert!(!err.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn ok_response_delivers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(json!({
                "chat_id": "-100",
                "text": "`v1\\.2`\nhttps://example\\.com",
                "parse_mode": "MarkdownV2",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri(), TOKEN, "-100").unwrap();
        notifier.deliver("v1.2", "https://example.com").await.unwrap();
    }

    #[tokio::test]
    async fn unauthorized_carries_api_description() {
        let (_server, notifier) = mock_api(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized",
        })))
        .await;

        let err = notifier.deliver("t", "l").await.unwrap_err();

        assert!(matches!(&err, RelayError::Delivery(msg) if msg.contains("Unauthorized")));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn ok_false_with_success_status_is_an_error() {
        let (_server, notifier) = mock_api(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: can't parse entities",
        })))
        .await;

        let err = notifier.deliver("t", "l").await.unwrap_err();
        assert!(matches!(&err, RelayError::Delivery(msg) if msg.contains("can't parse entities")));
    }

    #[tokio::test]
    async fn non_json_body_is_a_delivery_error() {
        let (_server, notifier) =
            mock_api(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>")).await;

        let err = notifier.deliver("t", "l").await.unwrap_err();
        assert!(matches!(&err, RelayError::Delivery(msg) if msg.contains("Bad Gateway")));
    }
}
