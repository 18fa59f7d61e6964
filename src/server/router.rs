//! HTTP router for the order API

use crate::orders::handlers::{create_order, get_order, health};
use crate::orders::service::OrderService;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Deadline for a single API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the order API routes
///
/// - GET /order/{order_uid} - Get an order by identifier
/// - POST /order - Create an order
/// - GET /health - Liveness probe
///
/// Every request gets a trace span and is answered with 408 once
/// [`REQUEST_TIMEOUT`] elapses.
pub fn build_router(service: OrderService) -> Router {
    Router::new()
        .route("/order/{order_uid}", get(get_order))
        .route("/order", post(create_order))
        .route("/health", get(health))
        .with_state(service)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                )),
        )
}
