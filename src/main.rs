//! Order service binary
//!
//! Wires the PostgreSQL store, the in-memory cache, the Kafka source and the
//! HTTP API together, then runs until SIGINT or SIGTERM.
//!
//! Configuration comes from `CONFIG_PATH` (a YAML file) when set, otherwise
//! from the environment. Any startup failure exits non-zero.

use anyhow::Result;
use order_service::prelude::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("order service failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = match std::env::var("CONFIG_PATH") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::from_env()?,
    };

    let store = PostgresOrderStore::connect(&config.database.connection_url()).await?;
    tracing::info!(
        host = %config.database.host,
        database = %config.database.name,
        "connected to store"
    );

    let service = OrderService::new(
        Arc::new(InMemoryOrderCache::new()),
        Arc::new(store.clone()),
    );

    let addr = config.http.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let source = KafkaSource::new(&config.kafka)?;

    let result = Lifecycle::new(
        build_router(service.clone()),
        listener,
        IngestionLoop::new(service),
        source,
    )
    .run(shutdown_signal())
    .await;

    store.close().await;
    tracing::info!("store closed");

    let stats = result?;
    tracing::info!(
        received = stats.received,
        saved = stats.saved,
        "order service stopped"
    );
    Ok(())
}
