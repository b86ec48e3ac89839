//! Uniform decision result produced by validators and mutators.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// HTTP-style code attached to decode failures.
pub const UNPROCESSABLE_ENTITY: u16 = 422;
/// HTTP-style code attached to patch synthesis failures.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Subset of the Kubernetes `metav1.Status` carried in admission responses.
///
/// Empty strings and a zero code are omitted on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

impl Status {
    /// A `Failure` status with the given code and message.
    pub fn failure_message(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: "Failure".to_string(),
            message: message.into(),
            reason: String::new(),
            code,
        }
    }

    /// A `Failure` status whose message is `"<description>: <err>"`.
    pub fn failure(code: u16, description: &str, err: impl Display) -> Self {
        Self::failure_message(code, format!("{}: {}", description, err))
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

/// Whether a request is admitted, with failure detail when it is not.
///
/// `allowed == false` without a status is legal but leaves the API server to
/// render a generic denial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub allowed: bool,
    pub status: Option<Status>,
}

impl Outcome {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            status: None,
        }
    }

    pub fn deny(status: Status) -> Self {
        Self {
            allowed: false,
            status: Some(status),
        }
    }

    pub fn deny_without_status() -> Self {
        Self {
            allowed: false,
            status: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}
