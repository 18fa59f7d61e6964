//! In-memory implementations of the cache and store ports
//!
//! [`InMemoryOrderCache`] is the production cache. [`InMemoryOrderStore`] is a
//! store double for tests and development that keeps the joined rows of every
//! order and folds them on read, like the SQL backend does.

use crate::core::error::{OrderError, PersistenceError};
use crate::core::order::Order;
use crate::core::service::{OrderCache, OrderStore};
use crate::storage::rows::{OrderRow, fold_rows};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Unbounded order cache guarded by a readers-writer lock
///
/// Readers share the lock; `set` takes it exclusively. There is no eviction,
/// so memory grows with the number of distinct orders seen by the process.
#[derive(Clone, Default)]
pub struct InMemoryOrderCache {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached orders
    pub fn len(&self) -> usize {
        self.orders.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderCache for InMemoryOrderCache {
    fn get(&self, order_uid: &str) -> Option<Order> {
        // A poisoned lock still holds a consistent map: writers only insert.
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        orders.get(order_uid).cloned()
    }

    fn set(&self, order_uid: &str, order: Order) {
        let mut orders = self.orders.write().unwrap_or_else(|e| e.into_inner());
        orders.insert(order_uid.to_string(), order);
    }
}

/// In-memory order store
///
/// Saves are atomic under one write lock and reject existing identifiers.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    rows: Arc<RwLock<HashMap<String, Vec<OrderRow>>>>,
}

impl InMemoryOrderStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_order(&self, order: &Order) -> Result<(), OrderError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| PersistenceError::backend("acquire write lock", e))?;

        if rows.contains_key(&order.order_uid) {
            return Err(PersistenceError::Duplicate {
                order_uid: order.order_uid.clone(),
            }
            .into());
        }

        rows.insert(order.order_uid.clone(), OrderRow::denormalize(order));
        Ok(())
    }

    async fn get_by_id(&self, order_uid: &str) -> Result<Order, OrderError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| PersistenceError::backend("acquire read lock", e))?;

        let joined = rows.get(order_uid).cloned().unwrap_or_default();
        fold_rows(joined).ok_or_else(|| OrderError::not_found(order_uid))
    }
}
