//! Shared fixtures for integration tests
//!
//! Provides sample orders, their JSON payloads, and counting doubles for the
//! cache and store ports.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

pub mod store_contract;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use order_service::core::error::{OrderError, PersistenceError};
use order_service::core::order::{Delivery, Item, Order, Payment};
use order_service::core::service::{OrderCache, OrderStore};
use order_service::storage::{InMemoryOrderCache, InMemoryOrderStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 11, 26, 6, 22, 19).unwrap()
}

pub fn sample_item(chrt_id: i64, name: &str) -> Item {
    Item {
        chrt_id,
        track_number: "WBILMTESTTRACK".to_string(),
        price: 453,
        rid: format!("ab4219087a764ae0btest{}", chrt_id),
        name: name.to_string(),
        sale: 30,
        size: "0".to_string(),
        total_price: 317,
        nm_id: 2389212,
        brand: "Vivienne Sabo".to_string(),
        status: 202,
    }
}

/// A fully populated valid order with one item
pub fn sample_order(order_uid: &str) -> Order {
    Order {
        order_uid: order_uid.to_string(),
        track_number: "WBILMTESTTRACK".to_string(),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Test Testov".to_string(),
            phone: "+9720000000".to_string(),
            zip: "2639809".to_string(),
            city: "Kiryat Mozkin".to_string(),
            address: "Ploshad Mira 15".to_string(),
            region: "Kraiot".to_string(),
            email: "test@gmail.com".to_string(),
        },
        payment: Payment {
            transaction: order_uid.to_string(),
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 1817,
            payment_dt: 1637907727,
            bank: "alpha".to_string(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![sample_item(9934930, "Mascaras")],
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: "test".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "9".to_string(),
        sm_id: 99,
        date_created: created_at(),
        oof_shard: "1".to_string(),
    }
}

/// A valid order with two items, in a fixed order
pub fn two_item_order(order_uid: &str) -> Order {
    let mut order = sample_order(order_uid);
    order.items = vec![
        sample_item(9934930, "Mascaras"),
        sample_item(1234567, "Lipstick"),
    ];
    order
}

/// The JSON payload of [`sample_order`]
pub fn sample_payload(order_uid: &str) -> Value {
    json!({
        "order_uid": order_uid,
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": order_uid,
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [{
            "chrt_id": 9934930,
            "track_number": "WBILMTESTTRACK",
            "price": 453,
            "rid": "ab4219087a764ae0btest9934930",
            "name": "Mascaras",
            "sale": 30,
            "size": "0",
            "total_price": 317,
            "nm_id": 2389212,
            "brand": "Vivienne Sabo",
            "status": 202
        }],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    })
}

pub fn payload_bytes(order_uid: &str) -> Vec<u8> {
    sample_payload(order_uid).to_string().into_bytes()
}

// ---------------------------------------------------------------------------
// Counting doubles
// ---------------------------------------------------------------------------

/// Store wrapper that counts calls and can be switched into failure mode
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: InMemoryOrderStore,
    saves: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.saves() + self.gets()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn persisted(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl OrderStore for CountingStore {
    async fn save_order(&self, order: &Order) -> Result<(), OrderError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("insert order", "connection refused").into());
        }
        self.inner.save_order(order).await
    }

    async fn get_by_id(&self, order_uid: &str) -> Result<Order, OrderError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("query order", "connection refused").into());
        }
        self.inner.get_by_id(order_uid).await
    }
}

/// Cache wrapper that counts hits, misses and writes
#[derive(Clone, Default)]
pub struct CountingCache {
    inner: InMemoryOrderCache,
    hits: Arc<AtomicUsize>,
    misses: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn contains(&self, order_uid: &str) -> bool {
        self.inner.get(order_uid).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl OrderCache for CountingCache {
    fn get(&self, order_uid: &str) -> Option<Order> {
        let found = self.inner.get(order_uid);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::SeqCst);
        found
    }

    fn set(&self, order_uid: &str, order: Order) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(order_uid, order);
    }
}
