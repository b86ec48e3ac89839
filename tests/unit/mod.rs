// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for the admission review core.
//!
//! These tests drive reviewers through the public API without any HTTP
//! transport and pin down the documented request outcomes.

#[path = "../common/mod.rs"]
mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Resource shape used by the reviewer scenarios
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct DataType {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    test: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    test2: String,
}

const DATA: &str = r#"{"test":"123"}"#;

mod mutating_reviewer_tests {
    use super::common::fixtures::{AdmissionRequestBuilder, namespace_kind};
    use super::*;
    use admission_review::review::{
        AdmissionResponse, Mutation, Outcome, PatchType, Reviewer, Status, SupportedKinds,
        review_as_mutator,
    };

    fn add_test2(data: DataType) -> Mutation<DataType> {
        let mut mutated = data.clone();
        mutated.test2 = "234".to_string();
        Mutation::patched(data, mutated)
    }

    #[test]
    fn test_mutating_review_allowed() {
        let reviewer = review_as_mutator(SupportedKinds::single(namespace_kind()), add_test2);
        let request = AdmissionRequestBuilder::new("123").object(DATA).build();

        let response = reviewer.review(&request);

        assert_eq!(
            response,
            AdmissionResponse {
                uid: "123".to_string(),
                allowed: true,
                result: None,
                patch_type: Some(PatchType::JsonPatch),
                patch: Some(br#"[{"op":"add","path":"/test2","value":"234"}]"#.to_vec()),
            }
        );

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["patchType"], "JSONPatch");
        assert_eq!(
            wire["patch"],
            STANDARD.encode(r#"[{"op":"add","path":"/test2","value":"234"}]"#)
        );
    }

    #[test]
    fn test_mutating_review_not_allowed() {
        let status = Status {
            status: "Failure".to_string(),
            message: "test".to_string(),
            ..Default::default()
        };
        let denial = status.clone();
        let reviewer = review_as_mutator(SupportedKinds::single(namespace_kind()), move |data: DataType| {
            let mut mutation = add_test2(data);
            mutation.outcome = Outcome::deny(denial.clone());
            mutation
        });
        let request = AdmissionRequestBuilder::new("123").object(DATA).build();

        let response = reviewer.review(&request);
        assert!(!response.allowed);
        assert_eq!(response.result, Some(status));
        assert!(response.patch.is_none());
        assert!(response.patch_type.is_none());
    }

    #[test]
    fn test_patch_is_applicable_to_original() {
        let reviewer = review_as_mutator(SupportedKinds::single(namespace_kind()), add_test2);
        let request = AdmissionRequestBuilder::new("1").object(DATA).build();

        let patch = reviewer.review(&request).json_patch().unwrap().unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(DATA).unwrap();
        json_patch::patch(&mut doc, &patch.0).unwrap();

        assert_eq!(doc, serde_json::json!({"test": "123", "test2": "234"}));
    }
}

mod validating_reviewer_tests {
    use super::common::fixtures::{AdmissionRequestBuilder, namespace_kind};
    use super::*;
    use admission_review::review::{
        Outcome, Reviewer, Status, SupportedKinds, review_as_validator,
    };

    #[test]
    fn test_validating_review_denied() {
        let reviewer = review_as_validator(SupportedKinds::single(namespace_kind()), |data: &DataType| {
            assert_eq!(data.test, "123");
            Outcome::deny(Status {
                status: "Failure".to_string(),
                message: "test".to_string(),
                ..Default::default()
            })
        });
        let request = AdmissionRequestBuilder::new("123").object(DATA).build();

        let wire = serde_json::to_value(reviewer.review(&request)).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "uid": "123",
                "allowed": false,
                "status": {"status": "Failure", "message": "test"}
            })
        );
    }

    #[test]
    fn test_validating_review_allowed() {
        let reviewer =
            review_as_validator(SupportedKinds::single(namespace_kind()), |_: &DataType| Outcome::allow());
        let request = AdmissionRequestBuilder::new("123").object(DATA).build();

        let response = reviewer.review(&request);
        assert!(response.allowed);
        assert!(response.result.is_none());
        assert!(response.patch.is_none());
    }
}

mod skip_and_decode_tests {
    use super::common::fixtures::namespace_kind;
    use super::*;
    use admission_review::review::{
        AdmissionResponse, Mutation, Outcome, ResourceKind, Reviewer, SupportedKinds,
        review_as_mutator, review_as_validator,
    };

    fn unsupported_kind() -> ResourceKind {
        ResourceKind::new("apps", "v1", "Deployment")
    }

    #[test]
    fn test_kind_mismatch_allows_even_garbage() {
        let validator = review_as_validator(SupportedKinds::single(namespace_kind()), |_: &DataType| {
            panic!("validator must not run for unsupported kinds")
        });
        let mutator = review_as_mutator(SupportedKinds::single(namespace_kind()), |_: DataType| -> Mutation<DataType> {
            panic!("mutator must not run for unsupported kinds")
        });

        for payload in [b"\x13\x37 random".as_slice(), b"".as_slice(), DATA.as_bytes()] {
            let expected = AdmissionResponse::allowed("42");
            assert_eq!(validator.review_raw("42", &unsupported_kind(), payload), expected);
            assert_eq!(mutator.review_raw("42", &unsupported_kind(), payload), expected);
        }

        let wire = serde_json::to_value(AdmissionResponse::allowed("42")).unwrap();
        assert_eq!(wire, serde_json::json!({"uid": "42", "allowed": true}));
    }

    #[test]
    fn test_empty_kind_set_always_skips() {
        let validator = review_as_validator(SupportedKinds::default(), |_: &DataType| Outcome::deny_without_status());
        assert!(validator.review_raw("1", &namespace_kind(), DATA.as_bytes()).allowed);
    }

    #[test]
    fn test_decode_failure_denies_with_422() {
        let validator = review_as_validator(SupportedKinds::single(namespace_kind()), |_: &DataType| {
            panic!("validator must not run when decoding fails")
        });

        let response = validator.review_raw("5", &namespace_kind(), br#"{"test": 5}"#);
        assert!(!response.allowed);
        assert!(response.patch.is_none());

        let status = response.result.unwrap();
        assert_eq!(status.code, 422);
        assert_eq!(status.status, "Failure");
        assert!(status.message.contains("failed to unmarshal"));
    }
}

mod namespace_policy_tests {
    use super::common::fixtures::{AdmissionRequestBuilder, namespace_json};
    use admission_review::review::Reviewer;
    use admission_review::webhooks::policies::{
        NAMESPACE_NAME_LABEL, NamespaceLabelPolicy, namespace_label_mutator,
        namespace_label_validator,
    };

    #[test]
    fn test_mutator_adds_label_patch() {
        let reviewer = namespace_label_mutator(NamespaceLabelPolicy);
        let request = AdmissionRequestBuilder::new("ns-1")
            .object(namespace_json("team-a", &[("team", "a")]))
            .build();

        let response = reviewer.review(&request);
        assert!(response.allowed);

        let patch: serde_json::Value =
            serde_json::from_slice(response.patch.as_deref().unwrap()).unwrap();
        assert_eq!(
            patch,
            serde_json::json!([{
                "op": "add",
                "path": "/metadata/labels/kubernetes.io~1metadata.name",
                "value": "team-a"
            }])
        );
    }

    #[test]
    fn test_mutator_leaves_labelled_namespace() {
        let reviewer = namespace_label_mutator(NamespaceLabelPolicy);
        let request = AdmissionRequestBuilder::new("ns-2")
            .object(namespace_json("team-a", &[(NAMESPACE_NAME_LABEL, "team-a")]))
            .build();

        let response = reviewer.review(&request);
        assert!(response.allowed);
        assert!(response.patch.is_none());
    }

    #[test]
    fn test_validator_requires_label() {
        let reviewer = namespace_label_validator(NamespaceLabelPolicy);

        let request = AdmissionRequestBuilder::new("ns-3")
            .object(namespace_json("team-a", &[]))
            .build();
        let response = reviewer.review(&request);
        assert!(!response.allowed);
        assert_eq!(response.result.unwrap().code, 422);

        let request = AdmissionRequestBuilder::new("ns-4")
            .object(namespace_json("team-a", &[(NAMESPACE_NAME_LABEL, "team-a")]))
            .build();
        assert!(reviewer.review(&request).allowed);
    }
}

mod concurrency_tests {
    use super::common::fixtures::{AdmissionRequestBuilder, namespace_json};
    use admission_review::review::Reviewer;
    use admission_review::webhooks::policies::{NamespaceLabelPolicy, namespace_label_mutator};
    use std::sync::Arc;

    #[test]
    fn test_reviewer_shared_across_threads() {
        let reviewer = Arc::new(namespace_label_mutator(NamespaceLabelPolicy));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reviewer = reviewer.clone();
                std::thread::spawn(move || {
                    let request = AdmissionRequestBuilder::new(format!("uid-{i}"))
                        .object(namespace_json(&format!("ns-{i}"), &[]))
                        .build();
                    reviewer.review(&request)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let response = handle.join().unwrap();
            assert_eq!(response.uid, format!("uid-{i}"));
            assert!(response.allowed);
            assert!(response.patch.is_some());
        }
    }
}
