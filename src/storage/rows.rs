//! Denormalized join rows
//!
//! A lookup joins `orders`, `deliveries`, `payments` and `items`, producing one
//! [`OrderRow`] per item with the order, delivery and payment columns repeated
//! on every row. [`fold_rows`] turns such a result back into one aggregate:
//! scalar fields come from the first row, and each row contributes one item in
//! the order the rows were returned.

use crate::core::order::{Delivery, Item, Order, Payment};
use chrono::{DateTime, Utc};

/// One row of the order lookup join
///
/// Item columns are optional because the items table is left-joined.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderRow {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,

    pub delivery_name: String,
    pub delivery_phone: String,
    pub delivery_zip: String,
    pub delivery_city: String,
    pub delivery_address: String,
    pub delivery_region: String,
    pub delivery_email: String,

    pub payment_transaction: String,
    pub payment_request_id: String,
    pub payment_currency: String,
    pub payment_provider: String,
    pub payment_amount: i64,
    pub payment_dt: i64,
    pub payment_bank: String,
    pub payment_delivery_cost: i64,
    pub payment_goods_total: i64,
    pub payment_custom_fee: i64,

    pub item_chrt_id: Option<i64>,
    pub item_track_number: Option<String>,
    pub item_price: Option<i64>,
    pub item_rid: Option<String>,
    pub item_name: Option<String>,
    pub item_sale: Option<i64>,
    pub item_size: Option<String>,
    pub item_total_price: Option<i64>,
    pub item_nm_id: Option<i64>,
    pub item_brand: Option<String>,
    pub item_status: Option<i64>,
}

impl OrderRow {
    /// Expand an order into the rows a lookup join would return for it
    pub fn denormalize(order: &Order) -> Vec<OrderRow> {
        if order.items.is_empty() {
            return vec![Self::from_parts(order, None)];
        }
        order
            .items
            .iter()
            .map(|item| Self::from_parts(order, Some(item)))
            .collect()
    }

    fn from_parts(order: &Order, item: Option<&Item>) -> OrderRow {
        let d = &order.delivery;
        let p = &order.payment;
        OrderRow {
            order_uid: order.order_uid.clone(),
            track_number: order.track_number.clone(),
            entry: order.entry.clone(),
            locale: order.locale.clone(),
            internal_signature: order.internal_signature.clone(),
            customer_id: order.customer_id.clone(),
            delivery_service: order.delivery_service.clone(),
            shardkey: order.shardkey.clone(),
            sm_id: order.sm_id,
            date_created: order.date_created,
            oof_shard: order.oof_shard.clone(),

            delivery_name: d.name.clone(),
            delivery_phone: d.phone.clone(),
            delivery_zip: d.zip.clone(),
            delivery_city: d.city.clone(),
            delivery_address: d.address.clone(),
            delivery_region: d.region.clone(),
            delivery_email: d.email.clone(),

            payment_transaction: p.transaction.clone(),
            payment_request_id: p.request_id.clone(),
            payment_currency: p.currency.clone(),
            payment_provider: p.provider.clone(),
            payment_amount: p.amount,
            payment_dt: p.payment_dt,
            payment_bank: p.bank.clone(),
            payment_delivery_cost: p.delivery_cost,
            payment_goods_total: p.goods_total,
            payment_custom_fee: p.custom_fee,

            item_chrt_id: item.map(|i| i.chrt_id),
            item_track_number: item.map(|i| i.track_number.clone()),
            item_price: item.map(|i| i.price),
            item_rid: item.map(|i| i.rid.clone()),
            item_name: item.map(|i| i.name.clone()),
            item_sale: item.map(|i| i.sale),
            item_size: item.map(|i| i.size.clone()),
            item_total_price: item.map(|i| i.total_price),
            item_nm_id: item.map(|i| i.nm_id),
            item_brand: item.map(|i| i.brand.clone()),
            item_status: item.map(|i| i.status),
        }
    }

    fn into_header(self) -> Order {
        Order {
            order_uid: self.order_uid,
            track_number: self.track_number,
            entry: self.entry,
            delivery: Delivery {
                name: self.delivery_name,
                phone: self.delivery_phone,
                zip: self.delivery_zip,
                city: self.delivery_city,
                address: self.delivery_address,
                region: self.delivery_region,
                email: self.delivery_email,
            },
            payment: Payment {
                transaction: self.payment_transaction,
                request_id: self.payment_request_id,
                currency: self.payment_currency,
                provider: self.payment_provider,
                amount: self.payment_amount,
                payment_dt: self.payment_dt,
                bank: self.payment_bank,
                delivery_cost: self.payment_delivery_cost,
                goods_total: self.payment_goods_total,
                custom_fee: self.payment_custom_fee,
            },
            items: Vec::new(),
            locale: self.locale,
            internal_signature: self.internal_signature,
            customer_id: self.customer_id,
            delivery_service: self.delivery_service,
            shardkey: self.shardkey,
            sm_id: self.sm_id,
            date_created: self.date_created,
            oof_shard: self.oof_shard,
        }
    }

    /// Item carried by this row, if the left join matched one
    fn item(&self) -> Option<Item> {
        Some(Item {
            chrt_id: self.item_chrt_id?,
            track_number: self.item_track_number.clone().unwrap_or_default(),
            price: self.item_price.unwrap_or_default(),
            rid: self.item_rid.clone().unwrap_or_default(),
            name: self.item_name.clone().unwrap_or_default(),
            sale: self.item_sale.unwrap_or_default(),
            size: self.item_size.clone().unwrap_or_default(),
            total_price: self.item_total_price.unwrap_or_default(),
            nm_id: self.item_nm_id.unwrap_or_default(),
            brand: self.item_brand.clone().unwrap_or_default(),
            status: self.item_status.unwrap_or_default(),
        })
    }
}

/// Fold a join result into one order
///
/// Returns `None` for an empty result, meaning the identifier is unknown.
pub fn fold_rows(rows: impl IntoIterator<Item = OrderRow>) -> Option<Order> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let first_item = first.item();
    let mut order = first.into_header();
    order.items.extend(first_item);
    order.items.extend(rows.filter_map(|row| row.item()));

    Some(order)
}
