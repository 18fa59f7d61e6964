//! Order service and its HTTP handlers

pub mod handlers;
pub mod service;

pub use service::OrderService;
