//! Kind-gated decoding of the submitted object.

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::DecodeError;
use super::kind::{ResourceKind, SupportedKinds};

/// Result of decoding a request object for a reviewer.
///
/// `Skip` and `Failed` must stay distinct: a skip admits the request untouched
/// while a decode failure denies it.
#[derive(Debug)]
pub enum Unmarshaled<T> {
    /// The request kind is not handled by this reviewer
    Skip,
    /// The object decoded into `T`
    Decoded(T),
    /// The kind matched but the payload did not decode
    Failed(DecodeError),
}

impl<T> Unmarshaled<T> {
    pub fn is_skip(&self) -> bool {
        matches!(self, Unmarshaled::Skip)
    }

    /// The decoded value, if any.
    pub fn decoded(self) -> Option<T> {
        match self {
            Unmarshaled::Decoded(value) => Some(value),
            _ => None,
        }
    }
}

/// Decode `raw` into `T` when `kind` is one of the `supported` kinds.
///
/// The payload is never inspected for unsupported kinds.
pub fn unmarshal<T>(raw: &[u8], kind: &ResourceKind, supported: &SupportedKinds) -> Unmarshaled<T>
where
    T: DeserializeOwned,
{
    if !supported.matches(kind) {
        debug!(kind = %kind, "Kind not supported by reviewer, skipping");
        return Unmarshaled::Skip;
    }

    match serde_json::from_slice(raw) {
        Ok(value) => Unmarshaled::Decoded(value),
        Err(e) => Unmarshaled::Failed(DecodeError::from(e)),
    }
}
