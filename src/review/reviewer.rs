//! Reviewers: kind matching, decoding, decision and patch synthesis wired
//! together for one resource type.
//!
//! Per request the flow is
//! `received -> matched | skipped -> decoded | decode failed -> decided ->
//! patch computed | no patch | patch failed -> responded`, with no retries.
//!
//! Decision callbacks are trusted: whatever outcome they return is passed
//! through. A callback that panics is a bug in the callback; reviewers do not
//! catch it, so callbacks must turn their own failures into a denying
//! [`Outcome`].

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::diff::{DiffOptions, diff_with};
use super::envelope::AdmissionRequest;
use super::kind::{ResourceKind, SupportedKinds};
use super::outcome::Outcome;
use super::response::{AdmissionResponse, assemble};
use super::unmarshal::{Unmarshaled, unmarshal};

/// Original and mutated object, compared to build the JSON Patch.
///
/// If either side is absent no patch is produced.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchPair<T> {
    pub before: Option<T>,
    pub after: Option<T>,
}

impl<T> PatchPair<T> {
    pub fn new(before: T, after: T) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
        }
    }
}

/// Result of a mutating decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    pub outcome: Outcome,
    pub patch: Option<PatchPair<T>>,
}

impl<T> Mutation<T> {
    /// Decision without any change to the object.
    pub fn unchanged(outcome: Outcome) -> Self {
        Self {
            outcome,
            patch: None,
        }
    }

    /// Allow, turning `before` into `after`.
    pub fn patched(before: T, after: T) -> Self {
        Self {
            outcome: Outcome::allow(),
            patch: Some(PatchPair::new(before, after)),
        }
    }
}

type ValidateFn<T> = Box<dyn Fn(&T) -> Outcome + Send + Sync>;
type MutateFn<T> = Box<dyn Fn(T) -> Mutation<T> + Send + Sync>;

/// The caller-supplied decision function.
pub enum Decision<T> {
    /// Validate only; never produces a patch
    Validate(ValidateFn<T>),
    /// Validate and optionally mutate
    Mutate(MutateFn<T>),
}

impl<T> Decision<T> {
    pub fn validate<F>(f: F) -> Self
    where
        F: Fn(&T) -> Outcome + Send + Sync + 'static,
    {
        Decision::Validate(Box::new(f))
    }

    pub fn mutate<F>(f: F) -> Self
    where
        F: Fn(T) -> Mutation<T> + Send + Sync + 'static,
    {
        Decision::Mutate(Box::new(f))
    }

    pub fn is_mutating(&self) -> bool {
        matches!(self, Decision::Mutate(_))
    }
}

impl<T> fmt::Debug for Decision<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Validate(_) => f.write_str("Decision::Validate"),
            Decision::Mutate(_) => f.write_str("Decision::Mutate"),
        }
    }
}

/// Anything that turns an admission request into an admission response.
///
/// Object safe so reviewers for different resource types can be mounted side
/// by side.
pub trait Reviewer: Send + Sync {
    /// Review an object given as raw JSON bytes.
    fn review_raw(&self, uid: &str, kind: &ResourceKind, raw: &[u8]) -> AdmissionResponse;

    fn review(&self, request: &AdmissionRequest) -> AdmissionResponse {
        self.review_raw(&request.uid, &request.kind, request.raw_object())
    }
}

/// Reviewer for resources of type `T`.
///
/// Immutable once built and safe to share between concurrent requests.
#[derive(Debug)]
pub struct AdmissionReviewer<T> {
    kinds: SupportedKinds,
    decision: Decision<T>,
    diff_options: DiffOptions,
}

impl<T> AdmissionReviewer<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(kinds: SupportedKinds, decision: Decision<T>) -> Self {
        Self {
            kinds,
            decision,
            diff_options: DiffOptions::default(),
        }
    }

    /// Validating reviewer for `kinds`.
    pub fn validating<F>(kinds: SupportedKinds, validate: F) -> Self
    where
        F: Fn(&T) -> Outcome + Send + Sync + 'static,
    {
        Self::new(kinds, Decision::validate(validate))
    }

    /// Mutating reviewer for `kinds`.
    pub fn mutating<F>(kinds: SupportedKinds, mutate: F) -> Self
    where
        F: Fn(T) -> Mutation<T> + Send + Sync + 'static,
    {
        Self::new(kinds, Decision::mutate(mutate))
    }

    pub fn with_diff_options(mut self, options: DiffOptions) -> Self {
        self.diff_options = options;
        self
    }

    pub fn kinds(&self) -> &SupportedKinds {
        &self.kinds
    }

    fn decide(&self, uid: &str, resource: T) -> AdmissionResponse {
        let mutate = match &self.decision {
            Decision::Validate(validate) => {
                let outcome = validate(&resource);
                debug!(uid = %uid, allowed = outcome.allowed, "Validation decided");
                return assemble(uid, outcome, None);
            }
            Decision::Mutate(mutate) => mutate,
        };

        let Mutation { outcome, patch } = mutate(resource);
        debug!(uid = %uid, allowed = outcome.allowed, "Mutation decided");

        let (before, after) = match patch {
            Some(PatchPair {
                before: Some(before),
                after: Some(after),
            }) if outcome.allowed => (before, after),
            _ => return assemble(uid, outcome, None),
        };

        match diff_with(&before, &after, self.diff_options) {
            Ok(patch) => {
                debug!(uid = %uid, patch_ops = patch.0.len(), "Patch computed");
                assemble(uid, outcome, Some(&patch))
            }
            Err(e) => {
                warn!(uid = %uid, error = %e, "Denying request, patch could not be computed");
                assemble(uid, Outcome::deny(e.status()), None)
            }
        }
    }
}

impl<T> Reviewer for AdmissionReviewer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn review_raw(&self, uid: &str, kind: &ResourceKind, raw: &[u8]) -> AdmissionResponse {
        match unmarshal::<T>(raw, kind, &self.kinds) {
            Unmarshaled::Skip => AdmissionResponse::allowed(uid),
            Unmarshaled::Failed(e) => {
                warn!(uid = %uid, kind = %kind, error = %e, "Denying request, object did not decode");
                AdmissionResponse::from_outcome(uid, Outcome::deny(e.status()))
            }
            Unmarshaled::Decoded(resource) => self.decide(uid, resource),
        }
    }
}

/// Build a validating reviewer: `(kinds, validate) -> reviewer`.
pub fn review_as_validator<T, F>(kinds: SupportedKinds, validate: F) -> AdmissionReviewer<T>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> Outcome + Send + Sync + 'static,
{
    AdmissionReviewer::validating(kinds, validate)
}

/// Build a mutating reviewer: `(kinds, mutate) -> reviewer`.
pub fn review_as_mutator<T, F>(kinds: SupportedKinds, mutate: F) -> AdmissionReviewer<T>
where
    T: Serialize + DeserializeOwned,
    F: Fn(T) -> Mutation<T> + Send + Sync + 'static,
{
    AdmissionReviewer::mutating(kinds, mutate)
}
