//! # Observability Module
//!
//! Logging, metrics and request tracing for the Herald node:
//!
//! - **Structured Logging**: JSON or pretty logs filtered by `RUST_LOG`
//! - **Prometheus Metrics**: HTTP, WebSocket and notification counters
//! - **Request Tracing**: Request ID propagation through a span per request
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::Router;
//! use herald_node::observability::{init_logging, metrics_layer, request_id_layer};
//!
//! init_logging("info", true);
//!
//! let app: Router<()> = Router::new()
//!     .layer(metrics_layer())
//!     .layer(request_id_layer());
//! ```

mod logging;
mod metrics;
pub mod middleware;

pub use logging::{init_logging, LogFormat};
pub use metrics::{metrics_handler, MetricsState, METRICS};
pub use middleware::{
    metrics_layer, request_id_layer, MiddlewareLayer, RequestId, REQUEST_ID_HEADER,
};
