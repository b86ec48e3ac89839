//! admission-review library crate
//!
//! Decision core for Kubernetes validating and mutating admission webhooks,
//! plus an axum transport and an example namespace policy.
//!
//! ```no_run
//! use admission_review::review::{Outcome, ResourceKind, SupportedKinds, review_as_validator};
//! use admission_review::webhooks::WebhookRoutes;
//! use k8s_openapi::api::core::v1::Namespace;
//!
//! let kinds = SupportedKinds::single(ResourceKind::of::<Namespace>());
//! let reviewer = review_as_validator(kinds, |_: &Namespace| Outcome::allow());
//! let routes = WebhookRoutes::new().route("/validate", reviewer);
//! ```

pub mod config;
pub mod health;
pub mod review;
pub mod webhooks;

pub use config::{Cli, ConfigError, ServerConfig, TlsConfig};
pub use health::HealthState;
pub use review::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, AdmissionReviewer, Mutation, Outcome,
    PatchPair, ResourceKind, Reviewer, Status, SupportedKinds, review_as_mutator,
    review_as_validator,
};
pub use webhooks::{WebhookError, WebhookRoutes, create_webhook_router, run_webhook_server};
