//! admission-webhook - example Kubernetes admission webhook.
//!
//! This is the main entry point that:
//! - Parses configuration from flags and environment
//! - Initializes structured logging
//! - Serves `/mutate` and `/validate` for the namespace label policy, plus
//!   `/health`, `/healthz`, `/readyz` and `/metrics`

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use admission_review::config::{Cli, ServerConfig, log_filter};
use admission_review::health::HealthState;
use admission_review::webhooks::policies::{
    NamespaceLabelPolicy, namespace_label_mutator, namespace_label_validator,
};
use admission_review::webhooks::{WebhookRoutes, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = ServerConfig::from_cli(&cli)?;
    info!(port = config.port, tls = config.tls.is_some(), "Starting admission webhook");

    let health_state = Arc::new(HealthState::new());
    let routes = WebhookRoutes::new()
        .route("/mutate", namespace_label_mutator(NamespaceLabelPolicy))
        .route("/validate", namespace_label_validator(NamespaceLabelPolicy));

    let server_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move { run_webhook_server(&config, routes, health_state).await })
    };

    tokio::select! {
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Webhook server stopped"),
                Ok(Err(e)) => {
                    error!("Webhook server error: {}", e);
                    return Err(e.into());
                }
                Err(e) => error!("Webhook server task panicked: {}", e),
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, shutting down");
            health_state.set_ready(false);
        }
    }

    info!("Admission webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Signal handler setup failures are fatal: without them the server cannot shut
/// down gracefully.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
