//! Request matching engine for gRPC mock stubs.
//!
//! Incoming request bodies and stored stub patterns are parsed into
//! [`JsonValue`] trees and compared by the [`Comparator`]:
//!
//! - [`matches`] - loose match; the target may carry extra fields
//! - [`equals`] - strict equality; used to detect duplicate stubs
//!
//! Parse failures are reported as [`MatchError`] and never turned into a
//! "no match" verdict.
//!
//! ```
//! use stub_matcher::{equals, matches, JsonValue};
//!
//! let pattern = JsonValue::parse_object(r#"{"id": 5}"#).unwrap();
//! let target = JsonValue::parse_object(r#"{"id": 5, "name": "x"}"#).unwrap();
//! assert!(matches(&pattern, &target));
//! assert!(!equals(&pattern, &target));
//! ```

pub mod config;
pub mod error;
pub mod json;
pub mod matcher;
pub mod store;
pub mod stub;

pub use config::MatcherConfig;
pub use error::MatchError;
pub use json::{CompactJson, JsonObject, JsonValue, ValueKind};
pub use matcher::{
    equals, matches, ArrayMatching, Comparator, MatchMode, Mismatch, MismatchReason,
};
pub use store::{InMemoryStubsStore, StoreError, StubsStore};
pub use stub::{
    ErrorDetails, ErrorDetailsSpec, ErrorDetailsValue, ErrorResponse, Metadata, RequestMatch,
    ResponseType, Stub, StubRequest, StubResponse,
};
