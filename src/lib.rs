//! # Order Service
//!
//! Ingests order events from a message stream, validates them, persists them
//! to a durable store and serves them over HTTP through an in-memory cache.
//!
//! ## Features
//!
//! - **Validated aggregate**: orders are checked field by field before any write
//! - **Write-through cache**: the cache is populated only after the store commits
//! - **Cache-aside reads**: misses fall through to the store and fill the cache
//! - **Pluggable ports**: `OrderCache` and `OrderStore` traits, with in-memory
//!   and PostgreSQL implementations
//! - **Stream ingestion**: a sequential consumer over any `MessageSource`,
//!   with a Kafka source behind the `kafka` feature
//! - **Graceful shutdown**: ordered drain of ingestion and in-flight requests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_service::prelude::*;
//!
//! let service = OrderService::new(
//!     Arc::new(InMemoryOrderCache::new()),
//!     Arc::new(InMemoryOrderStore::new()),
//! );
//!
//! let (tx, source) = ChannelSource::new(64);
//! let listener = TcpListener::bind("0.0.0.0:8081").await?;
//!
//! Lifecycle::new(
//!     build_router(service.clone()),
//!     listener,
//!     IngestionLoop::new(service),
//!     source,
//! )
//! .run(shutdown_signal())
//! .await?;
//! ```

pub mod config;
pub mod core;
pub mod ingest;
pub mod orders;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Delivery, ErrorResponse, IngestError, Item, Order, OrderCache, OrderError, OrderStore,
        Payment, PersistenceError, StartupError, ValidationError, validate_order,
        validate_order_id,
    };

    // === Service ===
    pub use crate::orders::OrderService;

    // === Ingestion ===
    #[cfg(feature = "kafka")]
    pub use crate::ingest::KafkaSource;
    pub use crate::ingest::{ChannelSource, IngestStats, IngestionLoop, MessageSource};

    // === Storage ===
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresOrderStore;
    pub use crate::storage::{InMemoryOrderCache, InMemoryOrderStore};

    // === Config ===
    pub use crate::config::{AppConfig, DatabaseConfig, HttpConfig, KafkaConfig};

    // === Server ===
    pub use crate::server::{Lifecycle, build_router, shutdown_signal};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use std::sync::Arc;
    pub use tokio::net::TcpListener;
    pub use tokio_util::sync::CancellationToken;
}
