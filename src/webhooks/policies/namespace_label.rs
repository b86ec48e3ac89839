//! Namespace name label policy.
//!
//! Ensures every Namespace carries `kubernetes.io/metadata.name`:
//! - mutate: adds the label with the namespace name when it is absent
//! - validate: denies namespaces without the label

use k8s_openapi::api::core::v1::Namespace;
use tracing::info;

use crate::review::outcome::UNPROCESSABLE_ENTITY;
use crate::review::{Mutation, Outcome, ResourceKind, Status, SupportedKinds};

/// Label that must be present on every namespace
pub const NAMESPACE_NAME_LABEL: &str = "kubernetes.io/metadata.name";

/// Adds and enforces the namespace name label.
#[derive(Clone, Debug, Default)]
pub struct NamespaceLabelPolicy;

impl NamespaceLabelPolicy {
    /// Kinds this policy applies to (`v1/Namespace`).
    pub fn kinds() -> SupportedKinds {
        SupportedKinds::single(ResourceKind::of::<Namespace>())
    }

    /// Add the label when it is missing.
    pub fn mutate(&self, namespace: Namespace) -> Mutation<Namespace> {
        let name = namespace.metadata.name.clone().unwrap_or_default();

        if has_name_label(&namespace) {
            info!(namespace = %name, label = NAMESPACE_NAME_LABEL, "Label present, no mutation applied");
            return Mutation::unchanged(Outcome::allow());
        }

        let mut mutated = namespace.clone();
        mutated
            .metadata
            .labels
            .get_or_insert_with(Default::default)
            .insert(NAMESPACE_NAME_LABEL.to_string(), name.clone());

        info!(namespace = %name, label = NAMESPACE_NAME_LABEL, "Label missing, adding it");
        Mutation::patched(namespace, mutated)
    }

    /// Deny namespaces without the label.
    pub fn validate(&self, namespace: &Namespace) -> Outcome {
        let name = namespace.metadata.name.as_deref().unwrap_or_default();

        if has_name_label(namespace) {
            info!(namespace = %name, label = NAMESPACE_NAME_LABEL, "Namespace passed validation");
            return Outcome::allow();
        }

        info!(namespace = %name, label = NAMESPACE_NAME_LABEL, "Namespace failed validation, label missing");
        Outcome::deny(
            Status::failure_message(
                UNPROCESSABLE_ENTITY,
                format!(
                    "The label {} is absent, but has to be mandatory set.",
                    NAMESPACE_NAME_LABEL
                ),
            )
            .with_reason("MissingLabel"),
        )
    }
}

fn has_name_label(namespace: &Namespace) -> bool {
    namespace
        .metadata
        .labels
        .as_ref()
        .is_some_and(|labels| labels.contains_key(NAMESPACE_NAME_LABEL))
}
