//! Error types for the review core.
//!
//! None of these escape a single request: each is folded into a denying
//! [`Outcome`](super::Outcome) by the reviewer.

use thiserror::Error;

use super::outcome::{INTERNAL_SERVER_ERROR, Status, UNPROCESSABLE_ENTITY};

/// The submitted object did not decode into the reviewer's resource type.
#[derive(Error, Debug)]
#[error("failed to unmarshal admission request object: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

impl DecodeError {
    /// Status reported back to the API server (422 Unprocessable).
    pub fn status(&self) -> Status {
        Status::failure_message(UNPROCESSABLE_ENTITY, self.to_string()).with_reason("Unprocessable")
    }
}

/// Patch synthesis or encoding failed.
#[derive(Error, Debug)]
pub enum DiffError {
    /// One side of the patch pair could not be encoded into a JSON tree
    #[error("failed to create JSON patch from request and response object: {0}")]
    Encode(#[source] serde_json::Error),

    /// The computed patch could not be serialized
    #[error("failed to marshal JSON patch: {0}")]
    Marshal(#[source] serde_json::Error),
}

impl DiffError {
    /// Status reported back to the API server (500 Internal Error).
    pub fn status(&self) -> Status {
        Status::failure_message(INTERNAL_SERVER_ERROR, self.to_string())
            .with_reason("InternalError")
    }
}
