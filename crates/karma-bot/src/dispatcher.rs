//! Single-consumer event loop: inbound events in, counter increments out.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use karma_core::{extract, CounterStore, InboundEvent, Karma};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Event source closed before shutdown was requested")]
    SourceClosed,
}

/// What happened to a single event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not a karma message.
    Ignored,
    /// The change was applied; `total` is the user's new score.
    Applied { karma: Karma, total: i64 },
    /// The event claimed to be a message but could not be read.
    ExtractFailed,
    /// The counter store rejected the increment. The change is dropped.
    StoreFailed { karma: Karma },
}

/// Counters for one run of the dispatcher.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchStats {
    pub events_received: usize,
    pub changes_applied: usize,
    pub events_ignored: usize,
    pub extract_failures: usize,
    pub store_failures: usize,
}

impl DispatchStats {
    fn record(&mut self, outcome: &Outcome) {
        self.events_received += 1;
        match outcome {
            Outcome::Ignored => self.events_ignored += 1,
            Outcome::Applied { .. } => self.changes_applied += 1,
            Outcome::ExtractFailed => self.extract_failures += 1,
            Outcome::StoreFailed { .. } => self.store_failures += 1,
        }
    }
}

/// Consumes inbound events in arrival order and applies karma changes.
pub struct Dispatcher<S: CounterStore> {
    events: mpsc::Receiver<InboundEvent>,
    store: Arc<S>,
}

impl<S: CounterStore> Dispatcher<S> {
    pub fn new(events: mpsc::Receiver<InboundEvent>, store: Arc<S>) -> Self {
        Self { events, store }
    }

    /// Process events until `shutdown` fires.
    ///
    /// Cancellation is only observed between events, so the event being
    /// handled always completes. No failure of a single event stops the loop.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<DispatchStats, DispatchError> {
        let mut stats = DispatchStats::default();

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = self.events.recv() => event,
            };

            let Some(event) = event else {
                tracing::error!(?stats, "Event source closed");
                return Err(DispatchError::SourceClosed);
            };

            let outcome = self.handle(&event).await;
            stats.record(&outcome);
        }

        tracing::info!(
            events = stats.events_received,
            applied = stats.changes_applied,
            failed = stats.extract_failures + stats.store_failures,
            "Dispatcher stopped"
        );
        Ok(stats)
    }

    /// Handle one event: extract, then apply at most one increment.
    pub async fn handle(&self, event: &InboundEvent) -> Outcome {
        let karma = match extract(event) {
            Ok(Some(karma)) => karma,
            Ok(None) => return Outcome::Ignored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to handle event");
                return Outcome::ExtractFailed;
            }
        };

        match self.store.increment_by(&karma.user_id, karma.change).await {
            Ok(total) => {
                tracing::info!(
                    user_id = %karma.user_id,
                    change = karma.change,
                    total,
                    "Karma updated"
                );
                Outcome::Applied { karma, total }
            }
            Err(e) => {
                tracing::error!(
                    user_id = %karma.user_id,
                    error = %e,
                    "Failed to adjust user's karma"
                );
                Outcome::StoreFailed { karma }
            }
        }
    }
}
