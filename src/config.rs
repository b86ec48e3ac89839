//! Command line and environment configuration for the webhook binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default webhook server port
pub const DEFAULT_PORT: u16 = 8080;

/// Log filter used when `RUST_LOG` is unset or empty
pub const DEFAULT_LOG_FILTER: &str = "admission_review=info";

/// Kubernetes admission webhook serving the namespace label policy
#[derive(Parser, Debug, Clone)]
#[command(name = "admission-webhook", version, about, long_about = None)]
pub struct Cli {
    /// Port on which the server listens for HTTP(S) requests
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path to the TLS certificate (PEM)
    #[arg(long, env = "WEBHOOK_TLS_CRT")]
    pub tls_crt: Option<PathBuf>,

    /// Path to the TLS private key (PEM)
    #[arg(long, env = "WEBHOOK_TLS_PRIV_KEY")]
    pub tls_priv_key: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "WEBHOOK_LOG_JSON")]
    pub log_json: bool,
}

/// Errors in the server configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Only one of certificate and key was given
    #[error("inconsistent TLS configuration: specify both the TLS certificate and private key or neither")]
    InconsistentTls,
}

/// Certificate and key for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Validated configuration handed to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// HTTPS when present, plain HTTP otherwise
    pub tls: Option<TlsConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tls: None,
        }
    }
}

impl ServerConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let tls = match (&cli.tls_crt, &cli.tls_priv_key) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::InconsistentTls),
        };

        Ok(Self {
            port: cli.port,
            tls,
        })
    }

    /// Address the server binds to (all interfaces)
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Build the log filter from `RUST_LOG`-style directives.
///
/// Directives given by the user win; [`DEFAULT_LOG_FILTER`] only applies when
/// there are none or they do not parse.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
