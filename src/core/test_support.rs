use crate::domain::model::{InboundUpdate, RenderedDocument};
use crate::domain::ports::{ChatTransport, DocumentConverter};
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct EchoConverter {
    last: Mutex<Option<String>>,
}

impl EchoConverter {
    pub fn last_markup(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentConverter for EchoConverter {
    async fn convert(&self, markup: &str) -> Result<Vec<u8>> {
        *self.last.lock().unwrap() = Some(markup.to_string());
        Ok(b"%PDF-1.4 fake".to_vec())
    }
}

pub struct FailingConverter;

#[async_trait]
impl DocumentConverter for FailingConverter {
    async fn convert(&self, _markup: &str) -> Result<Vec<u8>> {
        Err(BotError::Conversion {
            message: "engine unavailable".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: i64, text: String },
    Document { chat_id: i64, filename: String },
}

/// In-memory transport: scripted update batches in, recorded replies out.
#[derive(Default)]
pub struct RecordingTransport {
    batches: Mutex<VecDeque<Result<Vec<InboundUpdate>>>>,
    offsets: Mutex<Vec<i64>>,
    sent: Mutex<Vec<Sent>>,
    fail_documents: bool,
}

impl RecordingTransport {
    pub fn failing_documents() -> Self {
        Self {
            fail_documents: true,
            ..Self::default()
        }
    }

    pub fn push_batch(&self, batch: Result<Vec<InboundUpdate>>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<InboundUpdate>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // Nothing queued: behave like an idle long poll.
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Message {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, document: RenderedDocument) -> Result<()> {
        if self.fail_documents {
            return Err(BotError::Api {
                method: "sendDocument".to_string(),
                code: Some(400),
                description: "Bad Request: file is empty".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Document {
            chat_id,
            filename: document.filename,
        });
        Ok(())
    }
}
