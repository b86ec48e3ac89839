//! Example admission policies built on the review core.

pub mod namespace_label;

use k8s_openapi::api::core::v1::Namespace;

use crate::review::{AdmissionReviewer, review_as_mutator, review_as_validator};

pub use namespace_label::{NAMESPACE_NAME_LABEL, NamespaceLabelPolicy};

/// Mutating reviewer applying [`NamespaceLabelPolicy::mutate`].
pub fn namespace_label_mutator(policy: NamespaceLabelPolicy) -> AdmissionReviewer<Namespace> {
    review_as_mutator(NamespaceLabelPolicy::kinds(), move |namespace: Namespace| {
        policy.mutate(namespace)
    })
}

/// Validating reviewer applying [`NamespaceLabelPolicy::validate`].
pub fn namespace_label_validator(policy: NamespaceLabelPolicy) -> AdmissionReviewer<Namespace> {
    review_as_validator(NamespaceLabelPolicy::kinds(), move |namespace: &Namespace| {
        policy.validate(namespace)
    })
}
