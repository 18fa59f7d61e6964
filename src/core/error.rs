//! Typed error handling for the order service
//!
//! # Error Categories
//!
//! - [`ValidationError`]: caller-supplied data violates an aggregate invariant
//! - [`OrderError::NotFound`]: the identifier is unknown to the store
//! - [`PersistenceError`]: a store operation failed
//! - [`IngestError`]: the message transport failed
//! - [`StartupError`]: unrecoverable initialization failure
//!
//! [`OrderError`] is what the order service returns. It converts into an HTTP
//! response carrying an [`ErrorResponse`] body.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get("b563feb7b2b84b6test").await {
//!     Ok(order) => println!("{}", order.track_number),
//!     Err(OrderError::NotFound { order_uid }) => println!("{order_uid} not found"),
//!     Err(e) => eprintln!("lookup failed: {e}"),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Error returned by the order service and the store port
#[derive(Debug, Error)]
pub enum OrderError {
    /// Data supplied by the caller is invalid
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationError),

    /// No order with this identifier exists in the store
    #[error("order '{order_uid}' not found")]
    NotFound { order_uid: String },

    /// The store failed to complete the operation
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl OrderError {
    pub fn not_found(order_uid: impl Into<String>) -> Self {
        OrderError::NotFound {
            order_uid: order_uid.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "VALIDATION_ERROR",
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::Persistence(PersistenceError::Duplicate { .. }) => "ORDER_ALREADY_EXISTS",
            OrderError::Persistence(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            OrderError::Validation(e) => Some(serde_json::json!({ "field": e.field_path() })),
            OrderError::NotFound { order_uid } => {
                Some(serde_json::json!({ "order_uid": order_uid }))
            }
            OrderError::Persistence(PersistenceError::Duplicate { order_uid }) => {
                Some(serde_json::json!({ "order_uid": order_uid }))
            }
            OrderError::Persistence(_) => None,
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// First invariant violation found while validating an order or an identifier
///
/// Nested variants carry the position of the failing sub-entity so that
/// [`field_path`](Self::field_path) can name the exact field, e.g.
/// `items[2].price`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A scalar field violates its constraint
    #[error("{field} {reason}")]
    Field { field: &'static str, reason: String },

    #[error("delivery validation failed: {0}")]
    Delivery(Box<ValidationError>),

    #[error("payment validation failed: {0}")]
    Payment(Box<ValidationError>),

    #[error("at least one item is required")]
    NoItems,

    #[error("item[{index}] validation failed: {source}")]
    Item {
        index: usize,
        source: Box<ValidationError>,
    },

    /// Lookup identifier has the wrong shape
    #[error("order id {0}")]
    InvalidId(String),
}

impl ValidationError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending field
    pub fn field_path(&self) -> String {
        match self {
            ValidationError::Field { field, .. } => (*field).to_string(),
            ValidationError::Delivery(inner) => format!("delivery.{}", inner.field_path()),
            ValidationError::Payment(inner) => format!("payment.{}", inner.field_path()),
            ValidationError::NoItems => "items".to_string(),
            ValidationError::Item { index, source } => {
                format!("items[{}].{}", index, source.field_path())
            }
            ValidationError::InvalidId(_) => "order_uid".to_string(),
        }
    }
}

// =============================================================================
// Persistence Errors
// =============================================================================

/// Failure of a durable store operation
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Insert hit an existing `order_uid`; the store never overwrites
    #[error("order '{order_uid}' already exists")]
    Duplicate { order_uid: String },

    /// Any other backend failure
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl PersistenceError {
    pub fn backend(operation: &'static str, err: impl std::fmt::Display) -> Self {
        PersistenceError::Backend {
            operation,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Ingestion and Startup Errors
// =============================================================================

/// Failure of the message transport feeding the ingestion loop
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to receive message: {0}")]
    Receive(String),

    #[error("failed to close message source: {0}")]
    Close(String),
}

/// Unrecoverable initialization failure; the process exits non-zero
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    #[error("failed to connect to store: {0}")]
    Store(String),

    #[error("failed to bind API listener on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("failed to start message source: {0}")]
    Source(String),
}
