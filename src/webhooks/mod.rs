//! Webhook module serving admission reviews over HTTP(S).
//!
//! - `server`: axum transport mounting reviewers by path
//! - `policies`: example policies (namespace name label)

pub mod policies;
mod server;

pub use server::{
    ReviewRequestError, WebhookError, WebhookRoutes, create_webhook_router, run_webhook_server,
};
