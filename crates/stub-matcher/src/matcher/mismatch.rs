//! Diagnostics describing why two documents do not match.

use crate::json::{JsonValue, ValueKind};
use std::fmt;

/// Location of a value inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Why a comparison failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// Strict mode: the two objects have a different number of fields.
    FieldCount { expected: usize, actual: usize },
    /// A pattern field is absent from the target.
    MissingField,
    /// The values at this location are of different kinds.
    KindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    /// The arrays at this location differ in length.
    ArrayLength { expected: usize, actual: usize },
    /// No target element is available for the pattern element at this location.
    NoCandidate,
    /// Scalars of the same kind with different values.
    ValueMismatch,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::FieldCount { expected, actual } => {
                write!(f, "expected {expected} field(s), found {actual}")
            }
            MismatchReason::MissingField => f.write_str("field is missing"),
            MismatchReason::KindMismatch { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            MismatchReason::ArrayLength { expected, actual } => {
                write!(f, "expected {expected} element(s), found {actual}")
            }
            MismatchReason::NoCandidate => f.write_str("no matching element in target array"),
            MismatchReason::ValueMismatch => f.write_str("values differ"),
        }
    }
}

/// First failure found by the comparator, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Innermost segment first; reversed when rendered.
    segments: Vec<PathSegment>,
    reason: MismatchReason,
}

impl Mismatch {
    pub(crate) fn new(reason: MismatchReason) -> Self {
        Self {
            segments: Vec::new(),
            reason,
        }
    }

    pub(crate) fn within_key(mut self, key: &str) -> Self {
        self.segments.push(PathSegment::Key(key.to_string()));
        self
    }

    pub(crate) fn within_index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn reason(&self) -> &MismatchReason {
        &self.reason
    }

    /// Path of the failing value, e.g. `$.user.tags[1]`.
    ///
    /// Keys that are not plain identifiers use bracket form: `$["a.b"]`.
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for segment in self.segments.iter().rev() {
            match segment {
                PathSegment::Key(key) if is_plain_key(key) => {
                    path.push('.');
                    path.push_str(key);
                }
                PathSegment::Key(key) => {
                    path.push('[');
                    path.push_str(&JsonValue::String(key.clone()).to_compact_string());
                    path.push(']');
                }
                PathSegment::Index(index) => {
                    path.push_str(&format!("[{index}]"));
                }
            }
        }
        path
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.reason)
    }
}
