use crate::domain::model::{InboundUpdate, IncomingMessage, RenderedDocument};
use crate::domain::ports::ChatTransport;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

// Extra time on top of the long-poll window before the HTTP request itself gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    chat: WireChat,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    file_id: String,
}

impl From<WireUpdate> for InboundUpdate {
    fn from(update: WireUpdate) -> Self {
        InboundUpdate {
            update_id: update.update_id,
            message: update.message.map(|m| IncomingMessage {
                chat_id: m.chat.id,
                text: m.text.unwrap_or_default(),
            }),
        }
    }
}

/// Minimal Telegram Bot API client covering what the bot needs.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("endpoint", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(api_base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        })
    }

    /// Checks the token; used once at startup.
    pub async fn get_me(&self) -> Result<BotUser> {
        let request = self.client.post(self.method_url("getMe")).timeout(REQUEST_TIMEOUT);
        self.call("getMe", request).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Err(BotError::Api {
                    method: method.to_string(),
                    code: Some(i64::from(status.as_u16())),
                    description: format!("unreadable response ({}): {}", status, e),
                })
            }
        };

        if !envelope.ok {
            return Err(BotError::Api {
                method: method.to_string(),
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or_else(|| BotError::Api {
            method: method.to_string(),
            code: None,
            description: "response has no result".to_string(),
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<InboundUpdate>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(timeout + POLL_GRACE)
            .json(&body);

        let updates: Vec<WireUpdate> = self.call("getUpdates", request).await?;
        tracing::debug!("Received {} update(s) from offset {}", updates.len(), offset);
        Ok(updates.into_iter().map(InboundUpdate::from).collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({ "chat_id": chat_id, "text": text });
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(REQUEST_TIMEOUT)
            .json(&body);

        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, document: RenderedDocument) -> Result<()> {
        let size = document.bytes.len();
        let part = Part::bytes(document.bytes)
            .file_name(document.filename)
            .mime_str("application/pdf")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);
        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form);

        let sent: WireMessage = self.call("sendDocument", request).await?;
        match sent.document {
            Some(doc) => tracing::info!("Document sent ({} bytes), file_id {}", size, doc.file_id),
            None => tracing::info!("Document sent ({} bytes)", size),
        }
        Ok(())
    }
}
