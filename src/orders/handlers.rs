//! HTTP handlers for order operations
//!
//! - `GET /order/{order_uid}`: 200 with the order, 404 if unknown or malformed id
//! - `POST /order`: 201 with the order, 400 on a malformed body or invalid
//!   order, 500 on persistence failure
//! - `GET /health`: 200 `OK`, no dependency checks

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::core::error::{ErrorResponse, OrderError};
use crate::core::order::Order;
use crate::orders::service::OrderService;

/// Get an order by its identifier
pub async fn get_order(
    State(service): State<OrderService>,
    Path(order_uid): Path<String>,
) -> Response {
    tracing::debug!(order_uid = %order_uid, "fetching order");

    match service.get(&order_uid).await {
        Ok(order) => Json(order).into_response(),
        // An id that cannot exist is reported the same way as an unknown one
        Err(OrderError::Validation(e)) => {
            tracing::debug!(order_uid = %order_uid, error = %e, "rejected order id");
            OrderError::not_found(order_uid).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create an order from a JSON body
pub async fn create_order(State(service): State<OrderService>, body: Bytes) -> Response {
    let order = match Order::from_json(&body) {
        Ok(order) => order,
        Err(e) => return malformed_body(e),
    };

    match service.save(&order).await {
        Ok(()) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Liveness probe
pub async fn health() -> &'static str {
    "OK"
}

fn malformed_body(err: serde_json::Error) -> Response {
    let body = ErrorResponse {
        code: "MALFORMED_BODY".to_string(),
        message: format!("invalid body: {}", err),
        details: None,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
