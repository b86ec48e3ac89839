//! Assembly of the wire-level admission response.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use json_patch::Patch;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use super::error::DiffError;
use super::outcome::{Outcome, Status};

/// Patch encoding advertised alongside a patch. Only JSON Patch is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    JsonPatch,
}

/// The decision returned to the API server for a single request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_patch",
        deserialize_with = "deserialize_patch"
    )]
    pub patch: Option<Vec<u8>>,
}

impl AdmissionResponse {
    /// Build a response from a decision, without patch.
    pub fn from_outcome(uid: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            uid: uid.into(),
            allowed: outcome.allowed,
            result: outcome.status,
            patch_type: None,
            patch: None,
        }
    }

    /// An unconditional allow with no detail.
    pub fn allowed(uid: impl Into<String>) -> Self {
        Self::from_outcome(uid, Outcome::allow())
    }

    /// The decoded JSON Patch, if one is attached.
    pub fn json_patch(&self) -> Option<Result<Patch, serde_json::Error>> {
        self.patch.as_deref().map(serde_json::from_slice)
    }
}

/// Build the response for `uid` from a decision and an optional patch.
///
/// A denied outcome never carries a patch. A patch that fails to serialize
/// turns the response into an internal-error denial.
pub fn assemble(uid: &str, outcome: Outcome, patch: Option<&Patch>) -> AdmissionResponse {
    let patch = match patch {
        Some(patch) if outcome.allowed => patch,
        _ => return AdmissionResponse::from_outcome(uid, outcome),
    };

    match serde_json::to_vec(patch) {
        Ok(bytes) => {
            let mut response = AdmissionResponse::from_outcome(uid, outcome);
            response.patch = Some(bytes);
            response.patch_type = Some(PatchType::JsonPatch);
            response
        }
        Err(e) => {
            let err = DiffError::Marshal(e);
            warn!(uid = %uid, error = %err, "Denying request, patch could not be serialized");
            AdmissionResponse::from_outcome(uid, Outcome::deny(err.status()))
        }
    }
}

fn serialize_patch<S: Serializer>(patch: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match patch {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_patch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
    let encoded: Option<String> = Option::deserialize(deserializer)?;
    encoded
        .map(|encoded| STANDARD.decode(encoded).map_err(serde::de::Error::custom))
        .transpose()
}
