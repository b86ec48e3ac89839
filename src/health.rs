//! Health probes and Prometheus metrics for the webhook server.
//!
//! Provides:
//! - `/health` and `/healthz` - Liveness probe (always returns 200 if server is running)
//! - `/readyz` - Readiness probe (returns 200 once the server is accepting reviews)
//! - `/metrics` - Prometheus metrics endpoint
//!
//! Metrics belong to the transport. The review core never touches them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabel, EncodeLabelSet, LabelSetEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Labels for per-route metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RouteLabels {
    pub route: String,
}

impl EncodeLabelSet for RouteLabels {
    fn encode(&self, encoder: &mut LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("route", self.route.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for review decisions
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DecisionLabels {
    pub route: String,
    pub allowed: bool,
}

impl EncodeLabelSet for DecisionLabels {
    fn encode(&self, encoder: &mut LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("route", self.route.as_str()).encode(encoder.encode_label())?;
        let allowed = if self.allowed { "true" } else { "false" };
        ("allowed", allowed).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for rejected HTTP requests
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RequestErrorLabels {
    pub route: String,
    pub reason: String,
}

impl EncodeLabelSet for RequestErrorLabels {
    fn encode(&self, encoder: &mut LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("route", self.route.as_str()).encode(encoder.encode_label())?;
        ("reason", self.reason.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Shared metrics for the webhook server
pub struct Metrics {
    /// Reviews answered, by route and decision
    pub reviews_total: Family<DecisionLabels, Counter>,
    /// Responses that carried a JSON patch
    pub patches_total: Family<RouteLabels, Counter>,
    /// HTTP requests rejected before reaching a reviewer
    pub request_errors_total: Family<RequestErrorLabels, Counter>,
    /// Review duration histogram
    pub review_duration_seconds: Family<RouteLabels, Histogram>,
    /// Prometheus registry
    registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with registered metrics
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let reviews_total = Family::<DecisionLabels, Counter>::default();
        registry.register(
            "admission_reviews",
            "Total number of admission reviews answered",
            reviews_total.clone(),
        );

        let patches_total = Family::<RouteLabels, Counter>::default();
        registry.register(
            "admission_patches",
            "Total number of admission responses carrying a JSON patch",
            patches_total.clone(),
        );

        let request_errors_total = Family::<RequestErrorLabels, Counter>::default();
        registry.register(
            "admission_request_errors",
            "Total number of webhook requests rejected before review",
            request_errors_total.clone(),
        );

        let review_duration_seconds =
            Family::<RouteLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0001, 2.0, 15))
            });
        registry.register(
            "admission_review_duration_seconds",
            "Duration of admission reviews in seconds",
            review_duration_seconds.clone(),
        );

        Self {
            reviews_total,
            patches_total,
            request_errors_total,
            review_duration_seconds,
            registry,
        }
    }

    /// Record an answered review
    pub fn record_review(&self, route: &str, allowed: bool, patched: bool, duration_secs: f64) {
        let decision = DecisionLabels {
            route: route.to_string(),
            allowed,
        };
        self.reviews_total.get_or_create(&decision).inc();

        let labels = RouteLabels {
            route: route.to_string(),
        };
        if patched {
            self.patches_total.get_or_create(&labels).inc();
        }
        self.review_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a request rejected by the transport
    pub fn record_request_error(&self, route: &str, reason: &str) {
        let labels = RequestErrorLabels {
            route: route.to_string(),
            reason: reason.to_string(),
        };
        self.request_errors_total.get_or_create(&labels).inc();
    }

    /// Encode metrics to Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            tracing::error!("Failed to encode metrics");
            return "# Error encoding metrics".to_string();
        }
        buffer
    }
}

/// Shared state for the health endpoints
pub struct HealthState {
    /// Whether the server is accepting reviews
    ready: AtomicBool,
    /// Metrics registry
    pub metrics: Metrics,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (starts as not ready)
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            metrics: Metrics::new(),
        }
    }

    /// Mark the server as ready or not ready
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Liveness probe handler
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe handler
///
/// Returns 503 Service Unavailable until the listener is up.
async fn readyz(State(state): State<Arc<HealthState>>) -> Response {
    if state.is_ready() {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

/// Metrics handler
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let body = state.metrics.encode();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Create the health router. Only GET is routed; other methods get 405.
pub fn create_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(healthz))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
