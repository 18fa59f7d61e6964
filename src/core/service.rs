//! Port traits for the cache and the durable store
//!
//! The order service is agnostic to the concrete backends behind these
//! traits. Every implementation must honor the same contract, including the
//! error kinds it returns.

use crate::core::error::OrderError;
use crate::core::order::Order;
use async_trait::async_trait;

/// In-process key/value cache of orders keyed by `order_uid`
///
/// Reads may run in parallel; a write is exclusive with every other read and
/// write. Entries never expire and there is no capacity bound.
pub trait OrderCache: Send + Sync {
    /// Get the cached order for `order_uid`, if any
    fn get(&self, order_uid: &str) -> Option<Order>;

    /// Store `order` under `order_uid`, replacing any previous value
    ///
    /// Always succeeds. Last writer wins; there is no version check.
    fn set(&self, order_uid: &str, order: Order);
}

/// Durable multi-table repository of orders
///
/// Implementations return only [`OrderError::NotFound`] and
/// [`OrderError::Persistence`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order with its delivery, payment and items atomically
    ///
    /// Either every row is committed or none is. An existing `order_uid` is
    /// an integrity violation reported as
    /// [`PersistenceError::Duplicate`](crate::core::error::PersistenceError::Duplicate),
    /// never an overwrite.
    async fn save_order(&self, order: &Order) -> Result<(), OrderError>;

    /// Reconstruct one order with its items
    ///
    /// Fails with [`OrderError::NotFound`] when the identifier is unknown.
    async fn get_by_id(&self, order_uid: &str) -> Result<Order, OrderError>;
}

