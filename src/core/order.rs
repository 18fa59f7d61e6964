//! Order aggregate
//!
//! An [`Order`] owns exactly one [`Delivery`], one [`Payment`] and an ordered
//! list of [`Item`]s. The three children have no identity of their own: they
//! are validated, persisted and cached together with their order, keyed by
//! `order_uid`.
//!
//! The JSON shape matches the ingested message payload field-for-field. Missing
//! fields decode to their empty value so that [`validate_order`] rather than the
//! decoder reports the first absent mandatory field.
//!
//! [`validate_order`]: crate::core::validation::validate_order

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Root of the aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

/// Recipient and address of an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment details of an order
///
/// `payment_dt` is a unix timestamp in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single line of an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

impl Order {
    /// Lookup key shared by the cache and the store
    pub fn id(&self) -> &str {
        &self.order_uid
    }

    /// Decode an order from a raw JSON payload
    ///
    /// `date_created` is truncated to microseconds, the precision the store
    /// keeps, so a cached order and its stored copy compare equal.
    pub fn from_json(payload: &[u8]) -> serde_json::Result<Self> {
        let mut order: Order = serde_json::from_slice(payload)?;
        order.date_created = order.date_created.trunc_subsecs(6);
        Ok(order)
    }
}
