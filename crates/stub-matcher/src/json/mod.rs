//! JSON value model and compacted document text.

mod compact;
mod value;

pub use compact::{CompactJson, EMPTY_DOCUMENT};
pub use value::{JsonObject, JsonValue, ValueKind};
