//! Error types for parsing documents ahead of a comparison.
//!
//! Only the parse step can fail. A document that parses but does not match is
//! a `false` verdict, never an error.

use crate::json::ValueKind;
use thiserror::Error;

/// Errors raised before the comparator runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The text is not syntactically valid JSON.
    #[error("malformed JSON input: {0}")]
    MalformedInput(String),
    /// The text is valid JSON, but its root is not an object.
    #[error("expected a JSON object at the document root, found {0}")]
    NotAnObject(ValueKind),
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        MatchError::MalformedInput(err.to_string())
    }
}
