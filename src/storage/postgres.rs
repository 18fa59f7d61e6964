//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresOrderStore`], an [`OrderStore`] backed by a
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag.
//!
//! # Schema
//!
//! Each order is spread over four tables: `orders` (keyed by `order_uid`),
//! and `deliveries`, `payments`, `items` referencing it. Items carry a
//! `BIGSERIAL` id so a lookup returns them in insertion order.

use crate::core::error::{OrderError, PersistenceError, StartupError};
use crate::core::order::Order;
use crate::core::service::OrderStore;
use crate::storage::rows::{OrderRow, fold_rows};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

const SCHEMA: &[(&str, &str)] = &[
    (
        "orders",
        "CREATE TABLE IF NOT EXISTS orders (
            order_uid VARCHAR(50) PRIMARY KEY,
            track_number VARCHAR(50) NOT NULL,
            entry TEXT NOT NULL DEFAULT '',
            locale TEXT NOT NULL DEFAULT '',
            internal_signature TEXT NOT NULL DEFAULT '',
            customer_id TEXT NOT NULL DEFAULT '',
            delivery_service TEXT NOT NULL DEFAULT '',
            shardkey TEXT NOT NULL DEFAULT '',
            sm_id BIGINT NOT NULL DEFAULT 0,
            date_created TIMESTAMPTZ NOT NULL,
            oof_shard TEXT NOT NULL DEFAULT ''
        )",
    ),
    (
        "deliveries",
        "CREATE TABLE IF NOT EXISTS deliveries (
            order_uid VARCHAR(50) PRIMARY KEY REFERENCES orders (order_uid) ON DELETE CASCADE,
            name VARCHAR(100) NOT NULL,
            phone TEXT NOT NULL DEFAULT '',
            zip TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            region TEXT NOT NULL DEFAULT '',
            email VARCHAR(100) NOT NULL
        )",
    ),
    (
        "payments",
        "CREATE TABLE IF NOT EXISTS payments (
            order_uid VARCHAR(50) PRIMARY KEY REFERENCES orders (order_uid) ON DELETE CASCADE,
            transaction VARCHAR(50) NOT NULL,
            request_id TEXT NOT NULL DEFAULT '',
            currency VARCHAR(3) NOT NULL,
            provider TEXT NOT NULL DEFAULT '',
            amount BIGINT NOT NULL,
            payment_dt BIGINT NOT NULL DEFAULT 0,
            bank TEXT NOT NULL DEFAULT '',
            delivery_cost BIGINT NOT NULL DEFAULT 0,
            goods_total BIGINT NOT NULL DEFAULT 0,
            custom_fee BIGINT NOT NULL DEFAULT 0
        )",
    ),
    (
        "items",
        "CREATE TABLE IF NOT EXISTS items (
            id BIGSERIAL PRIMARY KEY,
            order_uid VARCHAR(50) NOT NULL REFERENCES orders (order_uid) ON DELETE CASCADE,
            chrt_id BIGINT NOT NULL,
            track_number TEXT NOT NULL DEFAULT '',
            price BIGINT NOT NULL,
            rid TEXT NOT NULL DEFAULT '',
            name VARCHAR(200) NOT NULL,
            sale BIGINT NOT NULL DEFAULT 0,
            size TEXT NOT NULL DEFAULT '',
            total_price BIGINT NOT NULL DEFAULT 0,
            nm_id BIGINT NOT NULL DEFAULT 0,
            brand TEXT NOT NULL DEFAULT '',
            status BIGINT NOT NULL DEFAULT 0
        )",
    ),
    (
        "items_order_uid_idx",
        "CREATE INDEX IF NOT EXISTS items_order_uid_idx ON items (order_uid)",
    ),
];

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StartupError> {
    for (name, ddl) in SCHEMA {
        sqlx::query(*ddl)
            .execute(pool)
            .await
            .map_err(|e| StartupError::Store(format!("failed to create {}: {}", name, e)))?;
    }
    Ok(())
}

const SELECT_ORDER: &str = "
    SELECT
        o.order_uid, o.track_number, o.entry, o.locale, o.internal_signature,
        o.customer_id, o.delivery_service, o.shardkey, o.sm_id, o.date_created, o.oof_shard,

        d.name AS delivery_name, d.phone AS delivery_phone, d.zip AS delivery_zip,
        d.city AS delivery_city, d.address AS delivery_address,
        d.region AS delivery_region, d.email AS delivery_email,

        p.transaction AS payment_transaction, p.request_id AS payment_request_id,
        p.currency AS payment_currency, p.provider AS payment_provider,
        p.amount AS payment_amount, p.payment_dt, p.bank AS payment_bank,
        p.delivery_cost AS payment_delivery_cost, p.goods_total AS payment_goods_total,
        p.custom_fee AS payment_custom_fee,

        i.chrt_id AS item_chrt_id, i.track_number AS item_track_number,
        i.price AS item_price, i.rid AS item_rid, i.name AS item_name,
        i.sale AS item_sale, i.size AS item_size, i.total_price AS item_total_price,
        i.nm_id AS item_nm_id, i.brand AS item_brand, i.status AS item_status
    FROM orders o
    JOIN deliveries d ON d.order_uid = o.order_uid
    JOIN payments p ON p.order_uid = o.order_uid
    LEFT JOIN items i ON i.order_uid = o.order_uid
    WHERE o.order_uid = $1
    ORDER BY i.id";

// ---------------------------------------------------------------------------
// PostgresOrderStore
// ---------------------------------------------------------------------------

/// Order store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let store = PostgresOrderStore::connect("postgres://user:pw@localhost/orders").await?;
/// store.save_order(&order).await?;
/// let loaded = store.get_by_id(&order.order_uid).await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, verify the connection and apply the schema
    pub async fn connect(url: &str) -> Result<Self, StartupError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| StartupError::Store(e.to_string()))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StartupError::Store(format!("ping failed: {}", e)))?;

        ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Classify a failed insert, surfacing primary-key clashes as duplicates
fn insert_error(operation: &'static str, order_uid: &str, err: sqlx::Error) -> PersistenceError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return PersistenceError::Duplicate {
                order_uid: order_uid.to_string(),
            };
        }
    }
    PersistenceError::backend(operation, err)
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn save_order(&self, order: &Order) -> Result<(), OrderError> {
        let uid = order.order_uid.as_str();
        // Dropping the transaction without commit rolls every insert back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::backend("begin transaction", e))?;

        sqlx::query(
            "INSERT INTO orders (order_uid, track_number, entry, locale, internal_signature, \
             customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(&order.locale)
        .bind(&order.internal_signature)
        .bind(&order.customer_id)
        .bind(&order.delivery_service)
        .bind(&order.shardkey)
        .bind(order.sm_id)
        .bind(order.date_created)
        .bind(&order.oof_shard)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error("insert order", uid, e))?;

        let d = &order.delivery;
        sqlx::query(
            "INSERT INTO deliveries (order_uid, name, phone, zip, city, address, region, email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(uid)
        .bind(&d.name)
        .bind(&d.phone)
        .bind(&d.zip)
        .bind(&d.city)
        .bind(&d.address)
        .bind(&d.region)
        .bind(&d.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error("insert delivery", uid, e))?;

        let p = &order.payment;
        sqlx::query(
            "INSERT INTO payments (order_uid, transaction, request_id, currency, provider, \
             amount, payment_dt, bank, delivery_cost, goods_total, custom_fee) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(uid)
        .bind(&p.transaction)
        .bind(&p.request_id)
        .bind(&p.currency)
        .bind(&p.provider)
        .bind(p.amount)
        .bind(p.payment_dt)
        .bind(&p.bank)
        .bind(p.delivery_cost)
        .bind(p.goods_total)
        .bind(p.custom_fee)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error("insert payment", uid, e))?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO items (order_uid, chrt_id, track_number, price, rid, name, \
                 sale, size, total_price, nm_id, brand, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(uid)
            .bind(item.chrt_id)
            .bind(&item.track_number)
            .bind(item.price)
            .bind(&item.rid)
            .bind(&item.name)
            .bind(item.sale)
            .bind(&item.size)
            .bind(item.total_price)
            .bind(item.nm_id)
            .bind(&item.brand)
            .bind(item.status)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error("insert item", uid, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| PersistenceError::backend("commit", e))?;

        tracing::debug!(order_uid = %uid, items = order.items.len(), "order persisted");
        Ok(())
    }

    async fn get_by_id(&self, order_uid: &str) -> Result<Order, OrderError> {
        let rows = sqlx::query_as::<_, OrderRow>(SELECT_ORDER)
            .bind(order_uid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PersistenceError::backend("query order", e))?;

        fold_rows(rows).ok_or_else(|| OrderError::not_found(order_uid))
    }
}
