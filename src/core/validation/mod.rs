//! Order validation
//!
//! [`validate_order`] runs once at the ingestion boundary (API write or stream
//! message) and is never repeated on read. It is fail-fast and evaluates in a
//! fixed order:
//!
//! ```text
//! order_uid → track_number → date_created → delivery → payment
//!           → items non-empty → items[0] → items[1] → ...
//! ```
//!
//! [`validate_order_id`] checks the shape of a lookup identifier before any
//! cache or store access.

pub mod validators;

use crate::core::error::ValidationError;
use crate::core::order::{Delivery, Item, Order, Payment};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;
use validators::*;

/// Maximum length of `order_uid`, `track_number` and `payment.transaction`
pub const MAX_ID_LEN: usize = 50;

/// Allowed clock skew for `date_created`
pub const DATE_SKEW_TOLERANCE: Duration = Duration::hours(1);

/// Upper bound on `payment.amount`
pub const MAX_PAYMENT_AMOUNT: i64 = 1_000_000_000;

/// Upper bound on `item.price`
pub const MAX_ITEM_PRICE: i64 = 100_000_000;

const MAX_CONTACT_LEN: usize = 100;
const MAX_CURRENCY_LEN: usize = 3;
const MAX_ITEM_NAME_LEN: usize = 200;

/// Validate a full order against the current clock
pub fn validate_order(order: &Order) -> Result<(), ValidationError> {
    validate_order_at(order, Utc::now())
}

/// Validate a full order, treating `now` as the current time
pub fn validate_order_at(order: &Order, now: DateTime<Utc>) -> Result<(), ValidationError> {
    required("order_uid", &order.order_uid)?;
    max_len("order_uid", &order.order_uid, MAX_ID_LEN)?;
    no_whitespace("order_uid", &order.order_uid)?;

    required("track_number", &order.track_number)?;
    max_len("track_number", &order.track_number, MAX_ID_LEN)?;

    not_in_future("date_created", order.date_created, now, DATE_SKEW_TOLERANCE)?;

    validate_delivery(&order.delivery).map_err(|e| ValidationError::Delivery(Box::new(e)))?;
    validate_payment(&order.payment).map_err(|e| ValidationError::Payment(Box::new(e)))?;

    if order.items.is_empty() {
        return Err(ValidationError::NoItems);
    }
    for (index, item) in order.items.iter().enumerate() {
        validate_item(item).map_err(|e| ValidationError::Item {
            index,
            source: Box::new(e),
        })?;
    }

    Ok(())
}

fn validate_delivery(delivery: &Delivery) -> Result<(), ValidationError> {
    required("name", &delivery.name)?;
    max_len("name", &delivery.name, MAX_CONTACT_LEN)?;

    required("email", &delivery.email)?;
    max_len("email", &delivery.email, MAX_CONTACT_LEN)?;
    email_shape("email", &delivery.email)
}

fn validate_payment(payment: &Payment) -> Result<(), ValidationError> {
    required("transaction", &payment.transaction)?;
    max_len("transaction", &payment.transaction, MAX_ID_LEN)?;

    positive("amount", payment.amount)?;
    max_value("amount", payment.amount, MAX_PAYMENT_AMOUNT)?;

    required("currency", &payment.currency)?;
    max_len("currency", &payment.currency, MAX_CURRENCY_LEN)
}

fn validate_item(item: &Item) -> Result<(), ValidationError> {
    required("name", &item.name)?;
    max_len("name", &item.name, MAX_ITEM_NAME_LEN)?;

    positive("price", item.price)?;
    max_value("price", item.price, MAX_ITEM_PRICE)?;

    non_negative("total_price", item.total_price)?;

    positive("chrt_id", item.chrt_id)
}

/// Validate the shape of a lookup identifier: 1..=50 chars of `[A-Za-z0-9_-]`
pub fn validate_order_id(id: &str) -> Result<(), ValidationError> {
    static ORDER_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ORDER_ID_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

    if id.is_empty() {
        return Err(ValidationError::InvalidId("is required".to_string()));
    }
    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::InvalidId(format!(
            "is too long (max {} characters)",
            MAX_ID_LEN
        )));
    }
    if !regex.is_match(id) {
        return Err(ValidationError::InvalidId(
            "contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
