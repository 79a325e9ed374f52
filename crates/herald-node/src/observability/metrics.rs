//! Prometheus metrics collection.

use axum::{body::Body, response::Response};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path pattern
    pub path: String,
    /// Response status code
    pub status: u16,
}

/// Notification labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct NotificationLabels {
    /// Entity kind (category, item)
    pub entity: String,
    /// Whether the notification was queued for dispatch
    pub queued: String,
}

/// Global metrics state.
pub static METRICS: Lazy<MetricsState> = Lazy::new(MetricsState::new);

/// Metrics state container.
#[derive(Clone)]
pub struct MetricsState {
    /// Prometheus registry.
    pub registry: Arc<RwLock<Registry>>,
    /// HTTP request counter.
    pub http_requests_total: Family<HttpLabels, Counter>,
    /// HTTP request duration histogram (seconds).
    pub http_request_duration_seconds: Family<HttpLabels, Histogram>,
    /// In-flight HTTP requests.
    pub http_active_requests: Gauge,
    /// Open WebSocket sessions.
    pub websocket_connections: Gauge,
    /// Inbound chat messages relayed by finished sessions.
    pub websocket_messages_relayed: Counter,
    /// Change notifications handed to the notifier.
    pub notifications_total: Family<NotificationLabels, Counter>,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests_total = Family::<HttpLabels, Counter>::default();
        registry.register(
            "herald_http_requests",
            "Total HTTP requests",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<HttpLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 16))
            });
        registry.register(
            "herald_http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_request_duration_seconds.clone(),
        );

        let http_active_requests = Gauge::default();
        registry.register(
            "herald_http_active_requests",
            "Number of in-flight HTTP requests",
            http_active_requests.clone(),
        );

        let websocket_connections = Gauge::default();
        registry.register(
            "herald_websocket_connections",
            "Number of open WebSocket sessions",
            websocket_connections.clone(),
        );

        let websocket_messages_relayed = Counter::default();
        registry.register(
            "herald_websocket_messages_relayed",
            "Inbound chat messages relayed",
            websocket_messages_relayed.clone(),
        );

        let notifications_total = Family::<NotificationLabels, Counter>::default();
        registry.register(
            "herald_notifications",
            "Change notifications scheduled for broadcast",
            notifications_total.clone(),
        );

        Self {
            registry: Arc::new(RwLock::new(registry)),
            http_requests_total,
            http_request_duration_seconds,
            http_active_requests,
            websocket_connections,
            websocket_messages_relayed,
            notifications_total,
        }
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: normalize_path(path),
            status,
        };
        self.http_requests_total.get_or_create(&labels).inc();
        self.http_request_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a change notification.
    pub fn record_notification(&self, entity: &str, queued: bool) {
        let labels = NotificationLabels {
            entity: entity.to_string(),
            queued: queued.to_string(),
        };
        self.notifications_total.get_or_create(&labels).inc();
    }

    /// Encode metrics for Prometheus scraping.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(e) = prometheus_client::encoding::text::encode(&mut buffer, &registry) {
            tracing::error!(error = %e, "Failed to encode metrics");
        }
        buffer
    }
}

/// Replace numeric path segments so ids do not explode label cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|part| {
            let numeric = part.strip_prefix('-').unwrap_or(part);
            if !numeric.is_empty() && numeric.chars().all(|c| c.is_ascii_digit()) {
                ":param"
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Get metrics endpoint handler.
pub async fn metrics_handler() -> Response<Body> {
    let metrics_output = METRICS.encode();

    Response::builder()
        .status(200)
        .header("content-type", "text/plain; version=0.0.4; charset=utf-8")
        .body(Body::from(metrics_output))
        .unwrap_or_else(|_| Response::new(Body::from("Failed to encode metrics")))
}
