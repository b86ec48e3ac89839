//! Test fixtures and builder patterns for admission reviews.

use std::collections::BTreeMap;

use admission_review::review::{AdmissionRequest, AdmissionReview, ResourceKind};

/// Kind used by most fixtures (`v1/Namespace`).
pub fn namespace_kind() -> ResourceKind {
    ResourceKind::new("", "v1", "Namespace")
}

/// Builder for creating AdmissionRequest test fixtures.
///
/// # Example
/// ```
/// let request = AdmissionRequestBuilder::new("123")
///     .kind(namespace_kind())
///     .object(r#"{"test":"123"}"#)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct AdmissionRequestBuilder {
    uid: String,
    kind: ResourceKind,
    operation: Option<String>,
    object: Option<String>,
}

impl AdmissionRequestBuilder {
    /// Create a new builder with the given request uid.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: namespace_kind(),
            operation: Some("CREATE".to_string()),
            object: None,
        }
    }

    /// Set the kind of the submitted object.
    pub fn kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the operation (CREATE, UPDATE, ...).
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the submitted object as JSON text.
    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Build the AdmissionRequest.
    #[allow(clippy::expect_used)]
    pub fn build(self) -> AdmissionRequest {
        let mut request = AdmissionRequest::new(self.uid, self.kind);
        if let Some(operation) = self.operation {
            request = request.with_operation(operation);
        }
        match self.object {
            Some(object) => request
                .with_object(&object)
                .expect("fixture object must be valid JSON"),
            None => request,
        }
    }

    /// Build the HTTP body of an inbound AdmissionReview.
    #[allow(clippy::expect_used)]
    pub fn review_body(self) -> String {
        serde_json::to_string(&AdmissionReview::from_request(self.build()))
            .expect("review must serialize")
    }
}

/// JSON text of a Namespace with the given name and labels.
#[allow(clippy::expect_used)]
pub fn namespace_json(name: &str, labels: &[(&str, &str)]) -> String {
    let mut metadata = serde_json::json!({ "name": name });
    if !labels.is_empty() {
        let labels: BTreeMap<&str, &str> = labels.iter().copied().collect();
        metadata["labels"] = serde_json::to_value(labels).expect("labels must serialize");
    }
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": metadata,
    })
    .to_string()
}
