use crate::domain::model::{InboundUpdate, RenderedDocument};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn bot_token(&self) -> &str;
    fn api_base_url(&self) -> &str;
    fn poll_timeout(&self) -> Duration;
    fn converter_binary(&self) -> &str;
    fn converter_args(&self) -> &[String];
    fn conversion_timeout(&self) -> Duration;
    fn monitoring_enabled(&self) -> bool;
}

/// Outbound and inbound side of the chat protocol.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Long-polls for updates with ids `>= offset`, waiting at most `timeout`.
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<InboundUpdate>>;
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_document(&self, chat_id: i64, document: RenderedDocument) -> Result<()>;
}

/// Turns rendered HTML into a fixed-layout PDF.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, markup: &str) -> Result<Vec<u8>>;
}
