//! Admission review decision core.
//!
//! - [`kind`]: resource kind identity and supported-kind matching
//! - [`unmarshal`]: kind-gated decoding of the submitted object
//! - [`reviewer`]: validating and mutating reviewers around caller decisions
//! - [`diff`]: JSON Patch synthesis between original and mutated objects
//! - [`response`]: admission response assembly
//! - [`envelope`]: AdmissionReview wire types
//!
//! Everything here is pure computation over in-memory data and holds no
//! shared mutable state; a reviewer can serve any number of concurrent requests.

pub mod diff;
pub mod envelope;
pub mod error;
pub mod kind;
pub mod outcome;
pub mod response;
pub mod reviewer;
pub mod unmarshal;

pub use diff::{DiffOptions, diff, diff_values, diff_values_with, diff_with};
pub use envelope::{AdmissionRequest, AdmissionReview};
pub use error::{DecodeError, DiffError};
pub use kind::{ResourceKind, SupportedKinds, matches};
pub use outcome::{Outcome, Status};
pub use response::{AdmissionResponse, PatchType, assemble};
pub use reviewer::{
    AdmissionReviewer, Decision, Mutation, PatchPair, Reviewer, review_as_mutator,
    review_as_validator,
};
pub use unmarshal::{Unmarshaled, unmarshal};
