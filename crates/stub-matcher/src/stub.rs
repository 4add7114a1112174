//! Stub definitions for mocked gRPC methods.
//!
//! A stub pairs a request pattern with a canned response and is keyed by the
//! full RPC method name (`/package.Service/Method`).

use crate::error::MatchError;
use crate::json::{CompactJson, JsonObject};
use crate::matcher::{Comparator, MatchMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request metadata (gRPC headers): key to list of values.
pub type Metadata = BTreeMap<String, Vec<String>>;

// ============================================================================
// Stub Types
// ============================================================================

/// Stub definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stub {
    pub full_method: String,
    pub request: StubRequest,
    pub response: StubResponse,
}

/// How a stub's request content is compared with an incoming request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMatch {
    /// The incoming request must equal the content exactly.
    #[default]
    Exact,
    /// The incoming request must contain every field of the content.
    Partial,
}

impl RequestMatch {
    pub fn mode(&self) -> MatchMode {
        match self {
            RequestMatch::Exact => MatchMode::Strict,
            RequestMatch::Partial => MatchMode::Subset,
        }
    }
}

/// Expected request of a stub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StubRequest {
    #[serde(rename = "match", default)]
    pub match_kind: RequestMatch,
    #[serde(default)]
    pub content: CompactJson,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

/// Kind of canned response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Success,
    Error,
}

/// Canned response of a stub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StubResponse {
    #[serde(rename = "type", default)]
    pub response_type: ResponseType,
    #[serde(default)]
    pub content: CompactJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

/// gRPC status returned by an error stub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Typed status details attached to an error response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ErrorDetailsSpec>,
    #[serde(default)]
    pub values: Vec<ErrorDetailsValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetailsValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_override: Option<ErrorDetailsSpec>,
    #[serde(default)]
    pub value: CompactJson,
}

/// Protobuf message type of a detail value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetailsSpec {
    pub import: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

// ============================================================================
// Matching
// ============================================================================

impl Stub {
    pub fn from_json(text: &str) -> Result<Self, MatchError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, MatchError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether `other` registers the same request as `self`: same method,
    /// match kind and metadata, and strictly equal request contents.
    pub fn same_request(&self, other: &Stub, comparator: &Comparator) -> Result<bool, MatchError> {
        if self.full_method != other.full_method
            || self.request.match_kind != other.request.match_kind
            || self.request.metadata != other.request.metadata
        {
            return Ok(false);
        }
        self.request
            .content
            .compare(&other.request.content, comparator, MatchMode::Strict)
    }
}

impl StubRequest {
    /// Whether an incoming request satisfies this stub.
    ///
    /// Every metadata key of the stub must be present in `metadata` with the
    /// same values; extra incoming metadata is ignored. The content is then
    /// compared according to the stub's match kind.
    pub fn accepts(
        &self,
        request: &JsonObject,
        metadata: &Metadata,
        comparator: &Comparator,
    ) -> Result<bool, MatchError> {
        let metadata_ok = self
            .metadata
            .iter()
            .all(|(key, values)| metadata.get(key) == Some(values));
        if !metadata_ok {
            return Ok(false);
        }
        let content = self.content.to_object()?;
        Ok(comparator.compare(&content, request, self.match_kind.mode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::JsonValue;

    const STUB: &str = r#"{
        "fullMethod": "/shop.Orders/GetOrder",
        "request": {
            "match": "partial",
            "content": { "id": 5 },
            "metadata": { "x-tenant": ["acme"] }
        },
        "response": {
            "type": "success",
            "content": { "id": 5, "status": "SHIPPED" }
        }
    }"#;

    #[test]
    fn test_stub_deserialization() {
        let stub = Stub::from_json(STUB).unwrap();
        assert_eq!(stub.full_method, "/shop.Orders/GetOrder");
        assert_eq!(stub.request.match_kind, RequestMatch::Partial);
        assert_eq!(stub.request.content.as_str(), r#"{"id":5}"#);
        assert_eq!(stub.request.metadata["x-tenant"], vec!["acme".to_string()]);
        assert_eq!(stub.response.response_type, ResponseType::Success);
        assert_eq!(stub.response.content.as_str(), r#"{"id":5,"status":"SHIPPED"}"#);
        assert!(stub.response.error.is_none());
    }

    #[test]
    fn test_stub_serialization_normalizes_empty_content() {
        let stub = Stub::from_json(
            r#"{"fullMethod": "/a.B/C", "request": {"match": "exact"}, "response": {"type": "success"}}"#,
        )
        .unwrap();
        assert_eq!(
            stub.to_json().unwrap(),
            r#"{"fullMethod":"/a.B/C","request":{"match":"exact","content":{}},"response":{"type":"success","content":{}}}"#
        );
    }

    #[test]
    fn test_error_response() {
        let stub = Stub::from_json(
            r#"{
                "fullMethod": "/a.B/C",
                "request": {"match": "exact", "content": {}},
                "response": {
                    "type": "error",
                    "error": {
                        "code": 5,
                        "message": "not found",
                        "details": {
                            "spec": {"import": "google/rpc/error_details.proto", "type": "google.rpc.ResourceInfo"},
                            "values": [{"value": {"resourceName": "order/5"}}]
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        let error = stub.response.error.unwrap();
        assert_eq!(error.code, 5);
        let details = error.details.unwrap();
        assert_eq!(details.spec.unwrap().type_name, "google.rpc.ResourceInfo");
        assert_eq!(details.values[0].value.as_str(), r#"{"resourceName":"order/5"}"#);
    }

    #[test]
    fn test_malformed_stub() {
        assert!(matches!(
            Stub::from_json(r#"{"fullMethod": 1}"#),
            Err(MatchError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_accepts_partial_and_exact() {
        let comparator = Comparator::default();
        let mut stub = Stub::from_json(STUB).unwrap();
        let metadata: Metadata = [("x-tenant".to_string(), vec!["acme".to_string()])]
            .into_iter()
            .collect();
        let request = JsonValue::parse_object(r#"{"id": 5, "verbose": true}"#).unwrap();

        assert!(stub.request.accepts(&request, &metadata, &comparator).unwrap());

        stub.request.match_kind = RequestMatch::Exact;
        assert!(!stub.request.accepts(&request, &metadata, &comparator).unwrap());

        let exact = JsonValue::parse_object(r#"{"id": 5}"#).unwrap();
        assert!(stub.request.accepts(&exact, &metadata, &comparator).unwrap());
    }

    #[test]
    fn test_accepts_requires_metadata() {
        let comparator = Comparator::default();
        let stub = Stub::from_json(STUB).unwrap();
        let request = JsonValue::parse_object(r#"{"id": 5}"#).unwrap();

        assert!(!stub
            .request
            .accepts(&request, &Metadata::new(), &comparator)
            .unwrap());

        let other_tenant: Metadata = [("x-tenant".to_string(), vec!["globex".to_string()])]
            .into_iter()
            .collect();
        assert!(!stub
            .request
            .accepts(&request, &other_tenant, &comparator)
            .unwrap());

        let with_extra: Metadata = [
            ("x-tenant".to_string(), vec!["acme".to_string()]),
            ("x-trace".to_string(), vec!["1".to_string()]),
        ]
        .into_iter()
        .collect();
        assert!(stub
            .request
            .accepts(&request, &with_extra, &comparator)
            .unwrap());
    }

    #[test]
    fn test_same_request() {
        let comparator = Comparator::default();
        let stub = Stub::from_json(STUB).unwrap();

        let mut copy = stub.clone();
        copy.response.content = CompactJson::new(r#"{"id": 5, "status": "PENDING"}"#).unwrap();
        assert!(stub.same_request(&copy, &comparator).unwrap());

        let mut other_method = stub.clone();
        other_method.full_method = "/shop.Orders/ListOrders".to_string();
        assert!(!stub.same_request(&other_method, &comparator).unwrap());

        let mut exact = stub.clone();
        exact.request.match_kind = RequestMatch::Exact;
        assert!(!stub.same_request(&exact, &comparator).unwrap());

        let mut wider = stub.clone();
        wider.request.content = CompactJson::new(r#"{"id": 5, "x": 1}"#).unwrap();
        assert!(!stub.same_request(&wider, &comparator).unwrap());
    }
}
