//! Resource kind identity and the supported-kind matcher.
//!
//! A reviewer only applies to the kinds it was configured with. Requests for any
//! other kind are passed through untouched.

use std::fmt;

use kube::Resource;
use kube::core::GroupVersionKind;
use serde::{Deserialize, Serialize};

/// Identifies a resource type by API group, API version and kind name.
///
/// Equality is exact and case-sensitive on all three fields. The core API group
/// is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKind {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ResourceKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Kind of a statically typed Kubernetes resource, e.g. `ResourceKind::of::<Namespace>()`.
    pub fn of<K>() -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        Self::new(K::group(&()), K::version(&()), K::kind(&()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}, Kind={}", self.version, self.kind)
        } else {
            write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
        }
    }
}

impl From<GroupVersionKind> for ResourceKind {
    fn from(gvk: GroupVersionKind) -> Self {
        Self {
            group: gvk.group,
            version: gvk.version,
            kind: gvk.kind,
        }
    }
}

impl From<ResourceKind> for GroupVersionKind {
    fn from(kind: ResourceKind) -> Self {
        GroupVersionKind::gvk(&kind.group, &kind.version, &kind.kind)
    }
}

/// The kinds a reviewer handles. Fixed at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportedKinds {
    kinds: Vec<ResourceKind>,
}

impl SupportedKinds {
    pub fn new(kinds: Vec<ResourceKind>) -> Self {
        Self { kinds }
    }

    /// Collect any iterable of kinds into a set.
    pub fn from_kinds(kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        kinds.into_iter().collect()
    }

    /// A set holding exactly one kind.
    pub fn single(kind: ResourceKind) -> Self {
        Self { kinds: vec![kind] }
    }

    /// Returns true iff `kind` equals one of the configured kinds on all three fields.
    pub fn matches(&self, kind: &ResourceKind) -> bool {
        self.kinds.iter().any(|supported| supported == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<ResourceKind> for SupportedKinds {
    fn from_iter<I: IntoIterator<Item = ResourceKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

/// Free-standing form of [`SupportedKinds::matches`].
pub fn matches(kind: &ResourceKind, supported: &SupportedKinds) -> bool {
    supported.matches(kind)
}
