//! Semantic comparison of JSON documents.
//!
//! The comparator walks a pattern object and a target object together and
//! answers whether they match under a [`MatchMode`]:
//!
//! - `Subset`: every pattern field must be present and equal in the target;
//!   the target may carry extra fields.
//! - `Strict`: both objects must have the same field set, at every level.
//!
//! A pattern field missing from the target fails in both modes. Values of
//! different kinds never match (no coercion between `"1"` and `1`). Arrays
//! are order-independent but length-sensitive in both modes; see
//! [`ArrayMatching`] for how duplicate elements are treated.
//!
//! # Module Structure
//!
//! - `array` - multiset comparison of arrays and scalar equality
//! - `mismatch` - diagnostics for failed comparisons

mod array;
mod mismatch;

pub use array::ArrayMatching;
pub use mismatch::{Mismatch, MismatchReason};

use crate::json::{JsonObject, JsonValue};
use array::scalar_equal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How strictly objects are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Pattern fields must be present in the target; extra fields are ignored.
    Subset,
    /// Field sets and values must be identical.
    Strict,
}

/// Recursive JSON comparator.
///
/// Holds no state besides its options, so one value can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Comparator {
    array_matching: ArrayMatching,
}

impl Comparator {
    pub fn new(array_matching: ArrayMatching) -> Self {
        Self { array_matching }
    }

    pub fn array_matching(&self) -> ArrayMatching {
        self.array_matching
    }

    /// Subset match of `pattern` against `target`.
    pub fn matches(&self, pattern: &JsonObject, target: &JsonObject) -> bool {
        self.compare(pattern, target, MatchMode::Subset)
    }

    /// Strict equality of `a` and `b`.
    pub fn equals(&self, a: &JsonObject, b: &JsonObject) -> bool {
        self.compare(a, b, MatchMode::Strict)
    }

    pub fn compare(&self, pattern: &JsonObject, target: &JsonObject, mode: MatchMode) -> bool {
        match self.explain(pattern, target, mode) {
            Ok(()) => true,
            Err(mismatch) => {
                trace!(?mode, %mismatch, "documents do not match");
                false
            }
        }
    }

    /// Compare and report the first failure, if any.
    pub fn explain(
        &self,
        pattern: &JsonObject,
        target: &JsonObject,
        mode: MatchMode,
    ) -> Result<(), Mismatch> {
        self.compare_objects(pattern, target, mode)
    }

    fn compare_objects(
        &self,
        pattern: &JsonObject,
        target: &JsonObject,
        mode: MatchMode,
    ) -> Result<(), Mismatch> {
        if mode == MatchMode::Strict && pattern.len() != target.len() {
            return Err(Mismatch::new(MismatchReason::FieldCount {
                expected: pattern.len(),
                actual: target.len(),
            }));
        }

        for (key, expected) in pattern {
            let actual = target
                .get(key)
                .ok_or_else(|| Mismatch::new(MismatchReason::MissingField).within_key(key))?;
            self.compare_values(expected, actual, mode)
                .map_err(|mismatch| mismatch.within_key(key))?;
        }
        Ok(())
    }

    fn compare_values(
        &self,
        expected: &JsonValue,
        actual: &JsonValue,
        mode: MatchMode,
    ) -> Result<(), Mismatch> {
        if expected.kind() != actual.kind() {
            return Err(Mismatch::new(MismatchReason::KindMismatch {
                expected: expected.kind(),
                actual: actual.kind(),
            }));
        }

        match (expected, actual) {
            (JsonValue::Object(expected), JsonValue::Object(actual)) => {
                self.compare_objects(expected, actual, mode)
            }
            (JsonValue::Array(expected), JsonValue::Array(actual)) => {
                self.compare_arrays(expected, actual, mode)
            }
            _ if scalar_equal(expected, actual) => Ok(()),
            _ => Err(Mismatch::new(MismatchReason::ValueMismatch)),
        }
    }
}

/// Subset match with default options: does `target` satisfy `pattern`?
pub fn matches(pattern: &JsonObject, target: &JsonObject) -> bool {
    Comparator::default().matches(pattern, target)
}

/// Strict equality with default options: are `a` and `b` the same document?
pub fn equals(a: &JsonObject, b: &JsonObject) -> bool {
    Comparator::default().equals(a, b)
}
