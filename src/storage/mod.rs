//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod rows;

pub use in_memory::{InMemoryOrderCache, InMemoryOrderStore};
#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderStore;
