//! Macro-generated test suite for `OrderStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod common;
//!
//! use common::*;
//! use order_service::storage::InMemoryOrderStore;
//!
//! order_store_tests!(InMemoryOrderStore::new());
//! ```
//!
//! # Generated Tests
//!
//! - `test_save_and_get`: every field survives the round trip
//! - `test_get_missing`: unknown id is `NotFound`
//! - `test_duplicate_save`: second save of an id is `Duplicate`, first copy intact
//! - `test_items_keep_their_order`: a two-item order comes back whole and in order
//! - `test_orders_are_isolated`: items never leak between orders
//! - `test_sub_microsecond_timestamp_round_trips`: a decoded nanosecond
//!   `date_created` comes back unchanged
//! - `test_concurrent_saves`: parallel saves from spawned tasks

/// Generate an `OrderStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test and must yield a store that is
/// `OrderStore + Clone + 'static`.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use order_service::core::error::{OrderError, PersistenceError};
            use order_service::core::service::OrderStore;

            #[tokio::test]
            async fn test_save_and_get() {
                let store = $factory;
                let order = sample_order("contract-save");

                store.save_order(&order).await.unwrap();
                let loaded = store.get_by_id("contract-save").await.unwrap();

                assert_eq!(loaded, order);
            }

            #[tokio::test]
            async fn test_get_missing() {
                let store = $factory;

                let err = store.get_by_id("contract-missing").await.unwrap_err();

                assert!(
                    matches!(err, OrderError::NotFound { ref order_uid } if order_uid == "contract-missing")
                );
            }

            #[tokio::test]
            async fn test_duplicate_save() {
                let store = $factory;
                let order = sample_order("contract-dup");
                store.save_order(&order).await.unwrap();

                let mut changed = order.clone();
                changed.track_number = "CHANGED".to_string();
                let err = store.save_order(&changed).await.unwrap_err();

                assert!(matches!(
                    err,
                    OrderError::Persistence(PersistenceError::Duplicate { .. })
                ));
                assert_eq!(store.get_by_id("contract-dup").await.unwrap(), order);
            }

            #[tokio::test]
            async fn test_items_keep_their_order() {
                let store = $factory;
                let order = two_item_order("contract-items");

                store.save_order(&order).await.unwrap();
                let loaded = store.get_by_id("contract-items").await.unwrap();

                assert_eq!(loaded.items.len(), 2);
                assert_eq!(loaded.items[0].name, "Mascaras");
                assert_eq!(loaded.items[1].name, "Lipstick");
                assert_eq!(loaded.delivery, order.delivery);
                assert_eq!(loaded.payment, order.payment);
            }

            #[tokio::test]
            async fn test_orders_are_isolated() {
                let store = $factory;
                store.save_order(&two_item_order("contract-a")).await.unwrap();
                store.save_order(&sample_order("contract-b")).await.unwrap();

                let b = store.get_by_id("contract-b").await.unwrap();

                assert_eq!(b.items.len(), 1);
                assert_eq!(b.payment.transaction, "contract-b");
            }

            #[tokio::test]
            async fn test_sub_microsecond_timestamp_round_trips() {
                let store = $factory;
                let mut payload = sample_payload("contract-nanos");
                payload["date_created"] = serde_json::json!("2021-11-26T06:22:19.123456789Z");
                let order = order_service::core::order::Order::from_json(
                    payload.to_string().as_bytes(),
                )
                .unwrap();

                store.save_order(&order).await.unwrap();
                let loaded = store.get_by_id("contract-nanos").await.unwrap();

                assert_eq!(loaded.date_created, order.date_created);
                assert_eq!(loaded, order);
            }

            #[tokio::test]
            async fn test_concurrent_saves() {
                let store = $factory;

                let handles = (0..8).map(|i| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        store
                            .save_order(&sample_order(&format!("contract-par-{}", i)))
                            .await
                    })
                });
                for result in futures::future::join_all(handles).await {
                    result.unwrap().unwrap();
                }

                for i in 0..8 {
                    let id = format!("contract-par-{}", i);
                    assert_eq!(store.get_by_id(&id).await.unwrap().order_uid, id);
                }
            }
        }
    };
}
