use crate::core::pipeline::{decode_prescription, DocumentPipeline};
use crate::domain::model::IncomingMessage;
use crate::domain::ports::{ChatTransport, DocumentConverter};
use crate::utils::error::{BotError, ErrorCategory};
use std::time::{Duration, Instant};

pub const START_COMMAND: &str = "/start";
pub const GREETING: &str = "Привет! Отправь мне JSON с данными рецепта.";
pub const TIMING_PREFIX: &str = "Обработка заняла:";

/// Terminal state reached for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Greeted,
    /// The payload was not a prescription object.
    Rejected,
    Failed(ErrorCategory),
    Delivered { elapsed: Duration },
}

pub struct Dispatcher<T: ChatTransport, C: DocumentConverter> {
    transport: T,
    pipeline: DocumentPipeline<C>,
}

impl<T: ChatTransport, C: DocumentConverter> Dispatcher<T, C> {
    pub fn new(transport: T, pipeline: DocumentPipeline<C>) -> Self {
        Self { transport, pipeline }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn handle(&self, message: &IncomingMessage) -> DispatchOutcome {
        let chat_id = message.chat_id;

        if message.text == START_COMMAND {
            self.reply(chat_id, GREETING).await;
            return DispatchOutcome::Greeted;
        }

        let rx = match decode_prescription(&message.text) {
            Ok(rx) => rx,
            Err(e) => {
                tracing::info!("Chat {}: rejected payload: {}", chat_id, e);
                self.reply(chat_id, e.user_friendly_message()).await;
                return DispatchOutcome::Rejected;
            }
        };

        let started = Instant::now();

        let document = match self.pipeline.produce(rx).await {
            Ok(document) => document,
            Err(e) => return self.fail(chat_id, e).await,
        };

        if let Err(e) = self.transport.send_document(chat_id, document).await {
            tracing::error!("Chat {}: sending document failed: {}", chat_id, e);
            return DispatchOutcome::Failed(e.category());
        }

        let elapsed = started.elapsed();
        tracing::info!("Chat {}: prescription delivered in {:?}", chat_id, elapsed);
        self.reply(chat_id, &format!("{} {:?}", TIMING_PREFIX, elapsed)).await;

        DispatchOutcome::Delivered { elapsed }
    }

    async fn fail(&self, chat_id: i64, error: BotError) -> DispatchOutcome {
        tracing::error!(
            "Chat {}: processing failed: {} (Category: {:?})",
            chat_id,
            error,
            error.category()
        );
        self.reply(chat_id, error.user_friendly_message()).await;
        DispatchOutcome::Failed(error.category())
    }

    // Replies are best effort: a failed send is logged and never retried.
    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            tracing::error!("Chat {}: reply failed: {}", chat_id, e);
        }
    }
}
