//! `admission.k8s.io/v1` AdmissionReview wire types.
//!
//! The request object is kept as raw JSON so that decoding stays with the
//! reviewer that knows the resource type.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::kind::ResourceKind;
use super::response::AdmissionResponse;

pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

/// Envelope exchanged with the API server in both directions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl AdmissionReview {
    /// Wrap a response into an outbound review.
    pub fn from_response(response: AdmissionResponse) -> Self {
        Self {
            api_version: Some(ADMISSION_API_VERSION.to_string()),
            kind: Some(ADMISSION_REVIEW_KIND.to_string()),
            request: None,
            response: Some(response),
        }
    }

    /// Wrap a request into an inbound review, as the API server would send it.
    pub fn from_request(request: AdmissionRequest) -> Self {
        Self {
            api_version: Some(ADMISSION_API_VERSION.to_string()),
            kind: Some(ADMISSION_REVIEW_KIND.to_string()),
            request: Some(request),
            response: None,
        }
    }
}

/// The part of an admission request the reviewers look at.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    /// Correlation identifier echoed in the response
    pub uid: String,
    /// Kind of the submitted object
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<RawValue>>,
}

impl AdmissionRequest {
    pub fn new(uid: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
            operation: None,
            name: None,
            namespace: None,
            dry_run: None,
            object: None,
        }
    }

    /// Attach the submitted object. Fails if `object` is not valid JSON.
    pub fn with_object(mut self, object: &str) -> Result<Self, serde_json::Error> {
        self.object = Some(RawValue::from_string(object.to_string())?);
        Ok(self)
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Raw bytes of the submitted object; empty when the request carries none.
    pub fn raw_object(&self) -> &[u8] {
        self.object
            .as_deref()
            .map(|raw| raw.get().as_bytes())
            .unwrap_or_default()
    }
}
