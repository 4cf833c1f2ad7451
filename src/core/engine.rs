use crate::core::dispatcher::{DispatchOutcome, Dispatcher};
use crate::domain::model::InboundUpdate;
use crate::domain::ports::{ChatTransport, DocumentConverter};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Sequential update loop: one message is fully handled before the next is read.
pub struct BotEngine<T: ChatTransport, C: DocumentConverter> {
    dispatcher: Dispatcher<T, C>,
    poll_timeout: Duration,
    retry_delay: Duration,
    monitor: SystemMonitor,
    offset: i64,
    // Offset last sent to the server; updates below it are confirmed there.
    confirmed: i64,
}

impl<T: ChatTransport, C: DocumentConverter> BotEngine<T, C> {
    pub fn new(dispatcher: Dispatcher<T, C>, poll_timeout: Duration) -> Self {
        Self {
            dispatcher,
            poll_timeout,
            retry_delay: DEFAULT_RETRY_DELAY,
            monitor: SystemMonitor::default(),
            offset: 0,
            confirmed: 0,
        }
    }

    pub fn new_with_monitoring(dispatcher: Dispatcher<T, C>, poll_timeout: Duration, monitor_enabled: bool) -> Self {
        Self {
            monitor: SystemMonitor::new(monitor_enabled),
            ..Self::new(dispatcher, poll_timeout)
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher<T, C> {
        &self.dispatcher
    }

    /// Next update id the engine will ask for.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// One long-poll round: fetch a batch and handle every message in it.
    pub async fn poll_once(&mut self) -> Result<Vec<DispatchOutcome>> {
        let updates = self.fetch().await?;
        Ok(self.handle_batch(updates).await)
    }

    /// Runs until `shutdown` resolves. A message already being handled is
    /// finished first; only the wait for new updates is interrupted.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("🚀 Polling for updates (timeout {:?})", self.poll_timeout);
        tokio::pin!(shutdown);

        loop {
            let fetched = tokio::select! {
                _ = &mut shutdown => break,
                fetched = self.fetch() => fetched,
            };

            match fetched {
                Ok(updates) => {
                    self.handle_batch(updates).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Fetching updates failed: {}; retrying in {:?}",
                        e,
                        self.retry_delay
                    );
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        tracing::info!("🛑 Shutdown requested, stopping update loop");
        self.confirm_handled().await;
        Ok(())
    }

    /// Tells the server about updates handled since the last fetch so they are
    /// not delivered again after a restart. Whatever the call returns is left
    /// unconfirmed.
    pub async fn confirm_handled(&mut self) {
        if self.offset <= self.confirmed {
            return;
        }

        match self
            .dispatcher
            .transport()
            .get_updates(self.offset, Duration::ZERO)
            .await
        {
            Ok(_) => {
                tracing::debug!("Confirmed updates below {}", self.offset);
                self.confirmed = self.offset;
            }
            Err(e) => tracing::warn!("Confirming updates below {} failed: {}", self.offset, e),
        }
    }

    async fn fetch(&mut self) -> Result<Vec<InboundUpdate>> {
        self.confirmed = self.offset;
        self.dispatcher
            .transport()
            .get_updates(self.offset, self.poll_timeout)
            .await
    }

    async fn handle_batch(&mut self, updates: Vec<InboundUpdate>) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(updates.len());

        for update in updates {
            // Moved past before handling: the next fetch confirms it even if handling fails.
            self.offset = self.offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                tracing::debug!("Skipping update {} without a message", update.update_id);
                continue;
            };

            let outcome = self.dispatcher.handle(&message).await;
            tracing::debug!("Update {} finished: {:?}", update.update_id, outcome);
            self.monitor.log_stats("message handled");
            outcomes.push(outcome);
        }

        outcomes
    }
}
