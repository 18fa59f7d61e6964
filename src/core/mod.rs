//! Core module containing the order aggregate, its validation and the port traits

pub mod error;
pub mod order;
pub mod service;
pub mod validation;

pub use error::{
    ErrorResponse, IngestError, OrderError, PersistenceError, StartupError, ValidationError,
};
pub use order::{Delivery, Item, Order, Payment};
pub use service::{OrderCache, OrderStore};
pub use validation::{validate_order, validate_order_id};
