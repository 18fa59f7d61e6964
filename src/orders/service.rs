//! Order service: validation, write-through persistence and cache-aside reads
//!
//! # Save
//!
//! ```text
//! validate ──✗──▶ ValidationError      (no store, no cache)
//!    │
//!    ▼
//! store.save_order ──✗──▶ PersistenceError   (no cache)
//!    │
//!    ▼
//! cache.set ──▶ Ok
//! ```
//!
//! The cache is only written after the store commits, so it never holds an
//! order the store does not.
//!
//! # Get
//!
//! ```text
//! validate id ──✗──▶ ValidationError   (no cache, no store)
//!    │
//!    ▼
//! cache.get ──hit──▶ Ok
//!    │ miss
//!    ▼
//! store.get_by_id ──✗──▶ NotFound / PersistenceError
//!    │
//!    ▼
//! cache.set ──▶ Ok
//! ```
//!
//! A concurrent reader may observe an order before or after a racing write
//! reaches the cache; nothing stronger is promised across writers.

use crate::core::error::OrderError;
use crate::core::order::Order;
use crate::core::service::{OrderCache, OrderStore};
use crate::core::validation::{validate_order, validate_order_id};
use std::sync::Arc;

/// Orchestrates the cache and store ports for one process
///
/// Cheap to clone; clones share the same cache and store.
#[derive(Clone)]
pub struct OrderService {
    cache: Arc<dyn OrderCache>,
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(cache: Arc<dyn OrderCache>, store: Arc<dyn OrderStore>) -> Self {
        Self { cache, store }
    }

    /// Validate and persist an order, then populate the cache
    pub async fn save(&self, order: &Order) -> Result<(), OrderError> {
        if let Err(e) = validate_order(order) {
            tracing::warn!(order_uid = %order.order_uid, error = %e, "order validation failed");
            return Err(e.into());
        }

        if let Err(e) = self.store.save_order(order).await {
            tracing::error!(order_uid = %order.order_uid, error = %e, "failed to save order");
            return Err(e);
        }

        self.cache.set(&order.order_uid, order.clone());
        Ok(())
    }

    /// Look up an order, serving from the cache when possible
    pub async fn get(&self, order_uid: &str) -> Result<Order, OrderError> {
        validate_order_id(order_uid)?;

        if let Some(order) = self.cache.get(order_uid) {
            return Ok(order);
        }

        let order = self.store.get_by_id(order_uid).await.inspect_err(|e| {
            tracing::debug!(order_uid = %order_uid, error = %e, "order lookup failed");
        })?;

        self.cache.set(order_uid, order.clone());
        Ok(order)
    }
}
