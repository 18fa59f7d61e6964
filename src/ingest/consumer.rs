//! Ingestion loop
//!
//! A single sequential consumer: each message is decoded and saved before the
//! next one is received. Neither a malformed payload nor a failed save stops
//! the loop; both are logged and the message counts as consumed. There is no
//! retry and no dead-letter queue.
//!
//! The loop ends when its [`CancellationToken`] fires, when the source reports
//! the end of the stream, or when the source itself fails.

use crate::core::error::IngestError;
use crate::core::order::Order;
use crate::ingest::source::MessageSource;
use crate::orders::service::OrderService;
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;

/// Counters reported when the loop stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Messages taken from the source
    pub received: u64,
    /// Orders validated and persisted
    pub saved: u64,
    /// Payloads that could not be decoded
    pub malformed: u64,
    /// Decoded orders the service refused (validation or persistence)
    pub rejected: u64,
}

/// Feeds a [`MessageSource`] into the order service
#[derive(Clone)]
pub struct IngestionLoop {
    service: OrderService,
}

impl IngestionLoop {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }

    /// Consume messages until cancelled or the stream ends
    pub async fn run<S>(
        &self,
        source: &mut S,
        cancel: CancellationToken,
    ) -> Result<IngestStats, IngestError>
    where
        S: MessageSource + ?Sized,
    {
        tracing::info!("ingestion loop started");
        let mut stats = IngestStats::default();

        loop {
            if cancel.is_cancelled() {
                tracing::info!("ingestion cancelled");
                break;
            }

            let payload = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("ingestion cancelled");
                    break;
                }
                next = source.recv() => match next {
                    Ok(Some(payload)) => payload,
                    Ok(None) => {
                        tracing::info!("message stream ended");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "message source failed");
                        return Err(e);
                    }
                },
            };

            stats.received += 1;
            if self.handle(&payload, &mut stats, &cancel).await.is_break() {
                tracing::info!("ingestion cancelled while saving");
                break;
            }
        }

        tracing::info!(
            received = stats.received,
            saved = stats.saved,
            malformed = stats.malformed,
            rejected = stats.rejected,
            "ingestion loop stopped"
        );
        Ok(stats)
    }

    async fn handle(
        &self,
        payload: &[u8],
        stats: &mut IngestStats,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        let order = match Order::from_json(payload) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, bytes = payload.len(), "discarding malformed message");
                stats.malformed += 1;
                return ControlFlow::Continue(());
            }
        };

        // An interrupted save drops its transaction, so nothing is half-written
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ControlFlow::Break(()),
            result = self.service.save(&order) => result,
        };

        match result {
            Ok(()) => {
                tracing::info!(order_uid = %order.order_uid, "order saved");
                stats.saved += 1;
            }
            Err(e) => {
                tracing::warn!(order_uid = %order.order_uid, error = %e, "discarding rejected order");
                stats.rejected += 1;
            }
        }
        ControlFlow::Continue(())
    }
}
