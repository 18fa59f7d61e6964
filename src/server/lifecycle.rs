//! Process lifecycle: run the API and the ingestion loop side by side, then
//! drain both in a fixed order
//!
//! Drain sequence, started by the shutdown future or by the ingestion loop
//! ending on its own:
//!
//! 1. Cancel the ingestion loop. A blocked receive returns at once; an
//!    in-flight save is abandoned and its transaction rolled back.
//! 2. Stop accepting API connections and let in-flight requests finish,
//!    bounded by the drain timeout. Requests still running after that are
//!    no longer awaited and end with the process.
//! 3. Wait for the ingestion task to exit.
//! 4. Close the message source.
//!
//! Closing the store is left to the caller, after [`Lifecycle::run`] returns.

use crate::core::error::IngestError;
use crate::ingest::{IngestStats, IngestionLoop, MessageSource};
use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Upper bound on waiting for in-flight API requests during shutdown
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the two long-running activities of the process
pub struct Lifecycle<S> {
    router: Router,
    listener: TcpListener,
    ingestion: IngestionLoop,
    source: S,
    drain_timeout: Duration,
}

impl<S> Lifecycle<S>
where
    S: MessageSource + 'static,
{
    pub fn new(router: Router, listener: TcpListener, ingestion: IngestionLoop, source: S) -> Self {
        Self {
            router,
            listener,
            ingestion,
            source,
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    /// Override the API drain bound
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Run until `shutdown` resolves or ingestion stops, then drain
    ///
    /// Returns the ingestion statistics, or the transport error that stopped
    /// ingestion.
    pub async fn run<F>(self, shutdown: F) -> Result<IngestStats, IngestError>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            router,
            listener,
            ingestion,
            mut source,
            drain_timeout,
        } = self;

        let cancel = CancellationToken::new();
        let api_stop = CancellationToken::new();

        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "API listening"),
            Err(e) => tracing::warn!(error = %e, "API listening on unknown address"),
        }

        let mut server = tokio::spawn(
            axum::serve(listener, router)
                .with_graceful_shutdown(api_stop.clone().cancelled_owned())
                .into_future(),
        );

        let mut ingest = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let result = ingestion.run(&mut source, cancel).await;
                (source, result)
            }
        });

        let finished_early = tokio::select! {
            _ = shutdown => {
                tracing::info!("shutdown requested, draining");
                None
            }
            joined = &mut ingest => {
                tracing::warn!("ingestion stopped before shutdown was requested, draining");
                Some(joined)
            }
        };

        cancel.cancel();
        tracing::debug!("ingestion cancelled");

        api_stop.cancel();
        match tokio::time::timeout(drain_timeout, &mut server).await {
            Ok(Ok(Ok(()))) => tracing::info!("API drained"),
            Ok(Ok(Err(e))) => tracing::error!(error = %e, "API server failed"),
            Ok(Err(e)) => tracing::error!(error = %e, "API server task failed"),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = drain_timeout.as_millis() as u64,
                    "drain timeout exceeded, abandoning in-flight requests"
                );
                server.abort();
            }
        }

        let joined = match finished_early {
            Some(joined) => joined,
            None => ingest.await,
        };
        let (mut source, result) = joined
            .map_err(|e| IngestError::Receive(format!("ingestion task failed: {}", e)))?;
        tracing::debug!("ingestion stopped");

        if let Err(e) = source.close().await {
            tracing::warn!(error = %e, "failed to close message source");
        }

        tracing::info!("shutdown complete");
        result
    }
}

/// Resolve on SIGINT (Ctrl+C) or SIGTERM
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ChannelSource;
    use crate::orders::OrderService;
    use crate::server::router::build_router;
    use crate::storage::{InMemoryOrderCache, InMemoryOrderStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn service() -> OrderService {
        OrderService::new(
            Arc::new(InMemoryOrderCache::new()),
            Arc::new(InMemoryOrderStore::new()),
        )
    }

    async fn lifecycle<S: MessageSource + 'static>(source: S) -> Lifecycle<S> {
        let service = service();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Lifecycle::new(
            build_router(service.clone()),
            listener,
            IngestionLoop::new(service),
            source,
        )
        .with_drain_timeout(Duration::from_millis(200))
    }

    /// Source that fails on first receive
    struct BrokenSource;

    #[async_trait]
    impl MessageSource for BrokenSource {
        async fn recv(&mut self) -> Result<Option<Vec<u8>>, IngestError> {
            Err(IngestError::Receive("broker unreachable".into()))
        }

        async fn close(&mut self) -> Result<(), IngestError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shutdown_future_stops_everything() {
        let (_tx, source) = ChannelSource::new(4);
        let lifecycle = lifecycle(source).await;

        let stats = tokio::time::timeout(
            Duration::from_secs(2),
            lifecycle.run(tokio::time::sleep(Duration::from_millis(20))),
        )
        .await
        .expect("lifecycle should finish after shutdown")
        .unwrap();

        assert_eq!(stats, IngestStats::default());
    }

    #[tokio::test]
    async fn test_exhausted_source_triggers_drain() {
        let (tx, source) = ChannelSource::new(4);
        drop(tx);
        let lifecycle = lifecycle(source).await;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            lifecycle.run(std::future::pending()),
        )
        .await
        .expect("lifecycle should finish when ingestion ends");

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let lifecycle = lifecycle(BrokenSource).await;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            lifecycle.run(std::future::pending()),
        )
        .await
        .expect("lifecycle should finish when the transport fails");

        assert!(matches!(result, Err(IngestError::Receive(_))));
    }
}
