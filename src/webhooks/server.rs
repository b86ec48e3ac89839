//! Admission webhook server.
//!
//! Provides HTTP endpoints for Kubernetes admission webhooks. Every mounted
//! reviewer answers `POST <path>` with an `AdmissionReview` body:
//! - any other method is rejected with 405
//! - an empty body is rejected with 400
//! - a body that is not an `AdmissionReview` with a `request` is rejected with 400
//!
//! Accepted reviews are always answered with 200 and the response review, even
//! when the request is denied.
//!
//! HTTPS is used when a certificate and key are configured, plain HTTP otherwise.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::health::{self, HealthState};
use crate::review::{AdmissionRequest, AdmissionReview, Reviewer};

/// Reviewers mounted by path.
#[derive(Default, Clone)]
pub struct WebhookRoutes {
    routes: Vec<(String, Arc<dyn Reviewer>)>,
}

impl WebhookRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `reviewer` on `path` (e.g. `/mutate`).
    pub fn route<R>(self, path: impl Into<String>, reviewer: R) -> Self
    where
        R: Reviewer + 'static,
    {
        self.route_shared(path, Arc::new(reviewer))
    }

    /// Mount an already shared reviewer on `path`.
    pub fn route_shared(mut self, path: impl Into<String>, reviewer: Arc<dyn Reviewer>) -> Self {
        self.routes.push((path.into(), reviewer));
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(path, _)| path.as_str())
    }
}

/// Errors rejecting a webhook HTTP request before any reviewer runs
#[derive(Debug, thiserror::Error)]
pub enum ReviewRequestError {
    /// The request carried no body
    #[error("body missing")]
    BodyMissing,

    /// The body is not a JSON AdmissionReview
    #[error("failed to read and unmarshal body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The AdmissionReview has no `request`
    #[error("admission review carries no request")]
    MissingRequest,
}

impl ReviewRequestError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ReviewRequestError::BodyMissing => "body_missing",
            ReviewRequestError::InvalidBody(_) => "invalid_body",
            ReviewRequestError::MissingRequest => "missing_request",
        }
    }
}

impl IntoResponse for ReviewRequestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

/// Errors that can occur when running the webhook server
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Route path that axum cannot mount
    #[error("invalid webhook route {0:?}: paths must start with '/'")]
    InvalidRoute(String),

    /// Same path mounted twice
    #[error("webhook route {0:?} is mounted more than once")]
    DuplicateRoute(String),

    /// Server error
    #[error("webhook server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Create the webhook router: mounted reviewers plus health and metrics.
///
/// Fails if a path does not start with `/` or is mounted twice.
pub fn create_webhook_router(
    routes: WebhookRoutes,
    state: Arc<HealthState>,
) -> Result<Router, WebhookError> {
    let mut router = Router::new();
    let mut mounted = HashSet::new();

    for (path, reviewer) in routes.routes {
        if !path.starts_with('/') {
            return Err(WebhookError::InvalidRoute(path));
        }
        if !mounted.insert(path.clone()) {
            return Err(WebhookError::DuplicateRoute(path));
        }

        let route: Arc<str> = Arc::from(path.as_str());
        let handler = move |State(state): State<Arc<HealthState>>, body: Bytes| {
            let route = route.clone();
            let reviewer = reviewer.clone();
            async move { handle_review(&route, reviewer.as_ref(), &state, &body) }
        };
        router = router.route(&path, post(handler));
    }

    Ok(router
        .with_state(state.clone())
        .merge(health::create_router(state)))
}

/// Decode the review, run the reviewer and wrap its response.
fn handle_review(
    route: &str,
    reviewer: &dyn Reviewer,
    state: &HealthState,
    body: &[u8],
) -> Result<Json<AdmissionReview>, ReviewRequestError> {
    let started = Instant::now();

    let request = parse_review(body).inspect_err(|e| {
        error!(route = %route, error = %e, "Error during request parsing");
        state.metrics.record_request_error(route, e.reason());
    })?;

    debug!(
        route = %route,
        uid = %request.uid,
        kind = %request.kind,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let response = reviewer.review(&request);
    let patched = response.patch.is_some();

    info!(
        route = %route,
        uid = %response.uid,
        allowed = response.allowed,
        patched,
        "Admission request reviewed"
    );
    state.metrics.record_review(
        route,
        response.allowed,
        patched,
        started.elapsed().as_secs_f64(),
    );

    Ok(Json(AdmissionReview::from_response(response)))
}

fn parse_review(body: &[u8]) -> Result<AdmissionRequest, ReviewRequestError> {
    if body.is_empty() {
        return Err(ReviewRequestError::BodyMissing);
    }
    let review: AdmissionReview = serde_json::from_slice(body)?;
    review.request.ok_or(ReviewRequestError::MissingRequest)
}

/// Run the webhook server until it fails.
///
/// Binds to `0.0.0.0:<port>`; serves HTTPS when `config.tls` is set.
pub async fn run_webhook_server(
    config: &ServerConfig,
    routes: WebhookRoutes,
    state: Arc<HealthState>,
) -> Result<(), WebhookError> {
    let paths: Vec<String> = routes.paths().map(str::to_string).collect();
    let app = create_webhook_router(routes, state.clone())?;
    let addr = config.bind_addr();

    match &config.tls {
        Some(tls) => {
            use axum_server::tls_rustls::RustlsConfig;

            let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

            info!(port = config.port, routes = ?paths, "Webhook server listening with TLS");
            state.set_ready(true);
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;

            info!(port = config.port, routes = ?paths, "Webhook server listening without TLS");
            state.set_ready(true);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
