//! JSON Patch synthesis between an original and a mutated object.
//!
//! Both objects are encoded into `serde_json::Value` trees and compared
//! structurally, so two encodings that differ only in formatting or key order
//! produce an empty patch.
//!
//! Rules:
//! - object members are visited in sorted key order; a member only in `after`
//!   becomes `add`, only in `before` becomes `remove`, in both is recursed into
//! - arrays are compared positionally; the common prefix is recursed into,
//!   surplus elements of `after` are added in ascending index order and surplus
//!   elements of `before` are removed in descending index order so that every
//!   index stays valid while the patch is applied
//! - any other difference (scalar change, type change) is a single `replace`
//!
//! The output is deterministic for a given pair of inputs.

use json_patch::jsonptr::PointerBuf;
use json_patch::{
    AddOperation, Patch, PatchOperation, RemoveOperation, ReplaceOperation, TestOperation,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::DiffError;

/// Knobs for patch synthesis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Precede every `remove` and `replace` with a `test` of the old value, so the
    /// patch fails to apply against a document that drifted from `before`.
    pub invertible: bool,
}

impl DiffOptions {
    pub fn invertible() -> Self {
        Self { invertible: true }
    }
}

/// Compute the patch turning `before` into `after` with default options.
pub fn diff<T: Serialize>(before: &T, after: &T) -> Result<Patch, DiffError> {
    diff_with(before, after, DiffOptions::default())
}

/// Compute the patch turning `before` into `after`.
pub fn diff_with<T: Serialize>(
    before: &T,
    after: &T,
    options: DiffOptions,
) -> Result<Patch, DiffError> {
    let before = serde_json::to_value(before).map_err(DiffError::Encode)?;
    let after = serde_json::to_value(after).map_err(DiffError::Encode)?;
    Ok(diff_values_with(&before, &after, options))
}

/// Patch between two already-encoded trees.
pub fn diff_values(before: &Value, after: &Value) -> Patch {
    diff_values_with(before, after, DiffOptions::default())
}

pub fn diff_values_with(before: &Value, after: &Value, options: DiffOptions) -> Patch {
    let mut differ = Differ {
        options,
        path: Vec::new(),
        ops: Vec::new(),
    };
    differ.compare(before, after);
    Patch(differ.ops)
}

struct Differ {
    options: DiffOptions,
    /// Unescaped reference tokens of the node under comparison
    path: Vec<String>,
    ops: Vec<PatchOperation>,
}

impl Differ {
    fn pointer(&self) -> PointerBuf {
        PointerBuf::from_tokens(self.path.iter().map(String::as_str))
    }

    fn compare(&mut self, before: &Value, after: &Value) {
        if before == after {
            return;
        }

        match (before, after) {
            (Value::Object(old), Value::Object(new)) => self.compare_objects(old, new),
            (Value::Array(old), Value::Array(new)) => self.compare_arrays(old, new),
            _ => self.replace(before, after),
        }
    }

    fn compare_objects(&mut self, before: &Map<String, Value>, after: &Map<String, Value>) {
        let mut keys: Vec<&String> = before
            .keys()
            .chain(after.keys().filter(|key| !before.contains_key(*key)))
            .collect();
        keys.sort();

        for key in keys {
            self.path.push(key.clone());
            match (before.get(key), after.get(key)) {
                (Some(old), Some(new)) => self.compare(old, new),
                (Some(old), None) => self.remove(old),
                (None, Some(new)) => self.add(new),
                (None, None) => {}
            }
            self.path.pop();
        }
    }

    fn compare_arrays(&mut self, before: &[Value], after: &[Value]) {
        let common = before.len().min(after.len());

        for (index, (old, new)) in before.iter().zip(after).enumerate() {
            self.path.push(index.to_string());
            self.compare(old, new);
            self.path.pop();
        }

        for (index, new) in after.iter().enumerate().skip(common) {
            self.path.push(index.to_string());
            self.add(new);
            self.path.pop();
        }

        for (index, old) in before.iter().enumerate().skip(common).rev() {
            self.path.push(index.to_string());
            self.remove(old);
            self.path.pop();
        }
    }

    fn add(&mut self, value: &Value) {
        self.ops.push(PatchOperation::Add(AddOperation {
            path: self.pointer(),
            value: value.clone(),
        }));
    }

    fn remove(&mut self, old: &Value) {
        self.test(old);
        self.ops.push(PatchOperation::Remove(RemoveOperation {
            path: self.pointer(),
        }));
    }

    fn replace(&mut self, old: &Value, new: &Value) {
        self.test(old);
        self.ops.push(PatchOperation::Replace(ReplaceOperation {
            path: self.pointer(),
            value: new.clone(),
        }));
    }

    fn test(&mut self, old: &Value) {
        if self.options.invertible {
            self.ops.push(PatchOperation::Test(TestOperation {
                path: self.pointer(),
                value: old.clone(),
            }));
        }
    }
}
