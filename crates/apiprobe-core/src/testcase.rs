//! Test case: the unit preparators emit
//!
//! A concrete request, the response it should produce, and the group
//! labels used to include or exclude it.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::Method;

/// A request body with its media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestBody {
    pub media_type: String,
    pub content: Value,
}

impl RequestBody {
    #[must_use]
    pub fn new(media_type: impl Into<String>, content: Value) -> Self {
        Self {
            media_type: media_type.into(),
            content,
        }
    }
}

/// Concrete request, path already rendered with its query string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestRequest {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

/// Expected status: one code, or a regex over the three-digit code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StatusMatcher {
    Exact(u16),
    Pattern(String),
}

impl Default for StatusMatcher {
    fn default() -> Self {
        Self::Exact(200)
    }
}

impl std::fmt::Display for StatusMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(code) => write!(f, "{code}"),
            Self::Pattern(p) => write!(f, "/{p}/"),
        }
    }
}

/// How the response body is compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BodyMatcher {
    /// Parsed JSON must equal this value
    Json(Value),
    /// Raw text must equal this string (surrounding whitespace ignored)
    Text(String),
    /// Parsed JSON must validate against this JSON Schema
    Schema(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedResponse {
    pub status: StatusMatcher,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyMatcher>,
}

impl ExpectedResponse {
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self {
            status: StatusMatcher::Exact(code),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: BodyMatcher) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    /// Unique within one preparator run: `<operationId>/<scenario>`
    pub name: String,
    pub preparator: String,
    pub operation_id: String,
    pub request: TestRequest,
    pub expected: ExpectedResponse,
    /// Operation labels plus the preparator name
    pub groups: Vec<String>,
    /// Response parts the comparator ignores: `header`, `body`, `body.<path>`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_fields: Vec<String>,
}

impl TestCase {
    /// Expected status when it is a single code.
    #[must_use]
    pub fn expected_status(&self) -> Option<u16> {
        match self.expected.status {
            StatusMatcher::Exact(code) => Some(code),
            StatusMatcher::Pattern(_) => None,
        }
    }

    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    #[must_use]
    pub fn excludes(&self, field: &str) -> bool {
        self.excluded_fields.iter().any(|f| f == field)
    }
}

/// JSON Schema of the emitted case list, as printed by `apiprobe schema`.
///
/// # Errors
///
/// Only if the generated schema cannot be serialized.
pub fn generate_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(Vec<TestCase>);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_case() -> TestCase {
        TestCase {
            name: "getPet/not_found".into(),
            preparator: "error404".into(),
            operation_id: "getPet".into(),
            request: TestRequest {
                method: Method::Get,
                path: "/pets/2147483647".into(),
                headers: IndexMap::new(),
                body: None,
            },
            expected: ExpectedResponse::status(404)
                .with_body(BodyMatcher::Text("Pet not found".into())),
            groups: vec!["getPet".into(), "error404".into()],
            excluded_fields: vec!["header".into()],
        }
    }

    #[test]
    fn status_matcher_untagged_serde() {
        let exact: StatusMatcher = serde_json::from_value(json!(404)).unwrap();
        assert_eq!(exact, StatusMatcher::Exact(404));
        let pattern: StatusMatcher = serde_json::from_value(json!("^2..$")).unwrap();
        assert_eq!(pattern, StatusMatcher::Pattern("^2..$".into()));
    }

    #[test]
    fn body_matcher_is_tagged() {
        let v = serde_json::to_value(BodyMatcher::Text("x".into())).unwrap();
        assert_eq!(v, json!({"kind": "text", "value": "x"}));
    }

    #[test]
    fn helpers() {
        let case = sample_case();
        assert_eq!(case.expected_status(), Some(404));
        assert!(case.in_group("error404"));
        assert!(case.excludes("header"));
        assert!(!case.excludes("body"));
    }

    #[test]
    fn serialization_roundtrip() {
        let case = sample_case();
        let json = serde_json::to_string(&case).unwrap();
        let parsed: TestCase = serde_json::from_str(&json).unwrap();
        assert_eq!(case, parsed);
    }
}
