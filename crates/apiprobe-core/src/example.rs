//! `OperationExample`: builder for one concrete request/response pairing
//!
//! Preparators start from an operation, layer overrides with the consuming
//! `with_*` setters, then freeze the result with [`OperationExample::into_test_case`].
//! Parameter values are kept string-encoded, the way they travel on the wire.

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::{
    ApiKeyLocation, Method, Operation, Parameter, ParameterIn, Security, SecurityScheme,
};
use crate::testcase::{BodyMatcher, ExpectedResponse, RequestBody, TestCase, TestRequest};

/// Characters escaped inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Characters escaped in query keys and values.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',');

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationExample {
    pub name: String,
    pub operation_id: String,
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub path_parameters: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub cookies: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(default)]
    pub response: ExpectedResponse,
}

impl OperationExample {
    /// Empty example bound to an operation's identity (id, method, path).
    #[must_use]
    pub fn new(name: impl Into<String>, operation: &Operation) -> Self {
        Self {
            name: name.into(),
            operation_id: operation.id.clone(),
            method: operation.method,
            path: operation.path.clone(),
            path_parameters: IndexMap::new(),
            query: IndexMap::new(),
            headers: IndexMap::new(),
            cookies: IndexMap::new(),
            body: None,
            response: ExpectedResponse::default(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a parameter from a JSON value (string-encoded, see [`encode_value`]).
    #[must_use]
    pub fn with_parameter(self, parameter: &Parameter, value: &Value) -> Self {
        self.with_raw_parameter(parameter.location, &parameter.name, encode_value(value))
    }

    /// Set a parameter from an already-encoded string.
    #[must_use]
    pub fn with_raw_parameter(
        self,
        location: ParameterIn,
        name: &str,
        value: impl Into<String>,
    ) -> Self {
        match location {
            ParameterIn::Path => self.with_path_parameter(name, value),
            ParameterIn::Query => self.with_query_parameter(name, value),
            ParameterIn::Header => self.with_header(name, value),
            ParameterIn::Cookie => self.with_cookie(name, value),
        }
    }

    #[must_use]
    pub fn with_path_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_parameters.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_query_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.insert(name.to_string(), value.into());
        self
    }

    /// Set a header, replacing any existing one with the same name (case-insensitive).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self
            .headers
            .keys()
            .position(|k| k.eq_ignore_ascii_case(name))
        {
            Some(idx) => {
                if let Some((_, v)) = self.headers.get_index_mut(idx) {
                    *v = value;
                }
            }
            None => {
                self.headers.insert(name.to_string(), value);
            }
        }
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn without_parameter(mut self, parameter: &Parameter) -> Self {
        match parameter.location {
            ParameterIn::Path => {
                self.path_parameters.shift_remove(&parameter.name);
            }
            ParameterIn::Query => {
                self.query.shift_remove(&parameter.name);
            }
            ParameterIn::Header => {
                self.headers
                    .retain(|k, _| !k.eq_ignore_ascii_case(&parameter.name));
            }
            ParameterIn::Cookie => {
                self.cookies.shift_remove(&parameter.name);
            }
        }
        self
    }

    #[must_use]
    pub fn has_parameter(&self, parameter: &Parameter) -> bool {
        match parameter.location {
            ParameterIn::Path => self.path_parameters.contains_key(&parameter.name),
            ParameterIn::Query => self.query.contains_key(&parameter.name),
            ParameterIn::Header => self
                .headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case(&parameter.name)),
            ParameterIn::Cookie => self.cookies.contains_key(&parameter.name),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: ExpectedResponse) -> Self {
        self.response = response;
        self
    }

    #[must_use]
    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.response = ExpectedResponse::status(status);
        self
    }

    #[must_use]
    pub fn with_expected_body(mut self, body: BodyMatcher) -> Self {
        self.response.body = Some(body);
        self
    }

    /// Attach a credential where the security scheme expects it.
    ///
    /// Basic credentials are taken as already encoded (`base64(user:pass)`).
    #[must_use]
    pub fn with_authentication(self, security: &Security, credential: &str) -> Self {
        match &security.scheme {
            SecurityScheme::HttpBasic => {
                self.with_header("Authorization", format!("Basic {credential}"))
            }
            SecurityScheme::HttpBearer { .. } | SecurityScheme::OAuth2 { .. } => {
                self.with_header("Authorization", format!("Bearer {credential}"))
            }
            SecurityScheme::ApiKey { key_name, location } => match location {
                ApiKeyLocation::Header => self.with_header(key_name, credential),
                ApiKeyLocation::Cookie => self.with_cookie(key_name, credential),
                ApiKeyLocation::Query => self.with_query_parameter(key_name, credential),
            },
        }
    }

    /// Fill every required parameter not yet set with its representative value,
    /// and a representative body when the body is always required.
    #[must_use]
    pub fn auto_complete(mut self, operation: &Operation) -> Self {
        for parameter in operation.required_parameters() {
            if !self.has_parameter(parameter) {
                let value = parameter.representative_value();
                self = self.with_parameter(parameter, &value);
            }
        }
        if self.body.is_none() && operation.body_always_required() {
            if let Some(request) = operation.requests.first() {
                self.body = Some(RequestBody::new(
                    request.media_type.clone(),
                    request.representative_content(),
                ));
            }
        }
        self
    }

    /// Path with placeholders substituted and the query string appended.
    ///
    /// Placeholders without a value are left as-is.
    #[must_use]
    pub fn render_path(&self) -> String {
        let mut path = self.path.clone();
        for (name, value) in &self.path_parameters {
            let encoded = utf8_percent_encode(value, PATH_SEGMENT).to_string();
            path = path.replace(&format!("{{{name}}}"), &encoded);
        }
        if !self.query.is_empty() {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(k, QUERY_COMPONENT),
                        utf8_percent_encode(v, QUERY_COMPONENT)
                    )
                })
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }

    /// Freeze into an immutable test case named `<operationId>/<example name>`.
    #[must_use]
    pub fn into_test_case(
        self,
        preparator: &str,
        groups: Vec<String>,
        excluded_fields: Vec<String>,
    ) -> TestCase {
        let path = self.render_path();
        let mut headers = self.headers;
        if !self.cookies.is_empty() {
            let cookie: Vec<String> = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            headers.insert("Cookie".to_string(), cookie.join("; "));
        }
        if let Some(body) = &self.body {
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("Content-Type".to_string(), body.media_type.clone());
            }
        }

        TestCase {
            name: format!("{}/{}", self.operation_id, self.name),
            preparator: preparator.to_string(),
            operation_id: self.operation_id,
            request: TestRequest {
                method: self.method,
                path,
                headers,
                body: self.body,
            },
            expected: self.response,
            groups,
            excluded_fields,
        }
    }
}

/// String form of a parameter value: strings raw, arrays comma-joined,
/// `null` empty, everything else as JSON text.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(encode_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{OAuth2Flow, Request};
    use serde_json::json;

    fn create_pet() -> Operation {
        Operation::new("createPet", Method::Post, "/owners/{owner}/pets")
            .with_parameter(
                Parameter::new("owner", ParameterIn::Path).with_example("default", json!("ann lee")),
            )
            .with_parameter(
                Parameter::new("dry_run", ParameterIn::Query)
                    .with_required(true)
                    .with_schema(json!({"type": "boolean"})),
            )
            .with_parameter(Parameter::new("trace", ParameterIn::Query))
            .with_parameter(
                Parameter::new("X-Tenant", ParameterIn::Header)
                    .with_required(true)
                    .with_example("default", json!("acme")),
            )
            .with_request(
                Request::new(
                    "application/json",
                    json!({"type": "object", "properties": {"name": {"type": "string"}}}),
                )
                .with_required(true),
            )
    }

    #[test]
    fn encode_value_forms() {
        assert_eq!(encode_value(&json!("foo")), "foo");
        assert_eq!(encode_value(&json!(1.234)), "1.234");
        assert_eq!(encode_value(&json!(5)), "5");
        assert_eq!(encode_value(&json!(true)), "true");
        assert_eq!(encode_value(&json!(["foo", "bar"])), "foo,bar");
        assert_eq!(encode_value(&Value::Null), "");
    }

    #[test]
    fn auto_complete_fills_required_only() {
        let op = create_pet();
        let ex = OperationExample::new("default", &op).auto_complete(&op);
        assert_eq!(ex.path_parameters["owner"], "ann lee");
        assert_eq!(ex.query["dry_run"], "true");
        assert!(!ex.query.contains_key("trace"));
        assert_eq!(ex.headers["X-Tenant"], "acme");
        assert_eq!(
            ex.body.as_ref().unwrap().content,
            json!({"name": "string"})
        );
    }

    #[test]
    fn auto_complete_keeps_explicit_values() {
        let op = create_pet();
        let ex = OperationExample::new("x", &op)
            .with_query_parameter("dry_run", "false")
            .auto_complete(&op);
        assert_eq!(ex.query["dry_run"], "false");
    }

    #[test]
    fn render_path_encodes_segments_and_query() {
        let op = create_pet();
        let ex = OperationExample::new("default", &op)
            .auto_complete(&op)
            .with_query_parameter("tags", "a b,c");
        assert_eq!(
            ex.render_path(),
            "/owners/ann%20lee/pets?dry_run=true&tags=a%20b,c"
        );
    }

    #[test]
    fn render_path_leaves_missing_placeholders() {
        let op = create_pet();
        let ex = OperationExample::new("x", &op);
        assert_eq!(ex.render_path(), "/owners/{owner}/pets");
    }

    #[test]
    fn without_parameter_removes_header_case_insensitively() {
        let op = create_pet();
        let header = op.parameter(ParameterIn::Header, "X-Tenant").unwrap();
        let ex = OperationExample::new("x", &op)
            .with_header("x-tenant", "acme")
            .without_parameter(header);
        assert!(ex.headers.is_empty());
        assert!(!ex.has_parameter(header));
    }

    #[test]
    fn with_header_replaces_case_insensitively() {
        let op = create_pet();
        let ex = OperationExample::new("x", &op)
            .with_header("authorization", "a")
            .with_header("Authorization", "b");
        assert_eq!(ex.headers.len(), 1);
        assert_eq!(ex.headers["authorization"], "b");
    }

    #[test]
    fn authentication_placement() {
        let op = create_pet();
        let basic = Security::http_basic("basic");
        let ex = OperationExample::new("x", &op).with_authentication(&basic, "YWFhYTpiYmJiYg==");
        assert_eq!(ex.headers["Authorization"], "Basic YWFhYTpiYmJiYg==");

        let oauth = Security::oauth2("oauth", OAuth2Flow::Implicit);
        let ex = OperationExample::new("x", &op).with_authentication(&oauth, "tok");
        assert_eq!(ex.headers["Authorization"], "Bearer tok");

        let cookie = Security::api_key("key", "session", ApiKeyLocation::Cookie);
        let case = OperationExample::new("x", &op)
            .with_authentication(&cookie, "abc")
            .with_cookie("lang", "en")
            .into_test_case("error401", vec![], vec![]);
        assert_eq!(case.request.headers["Cookie"], "session=abc; lang=en");

        let query = Security::api_key("key", "api_key", ApiKeyLocation::Query);
        let ex = OperationExample::new("x", &op).with_authentication(&query, "abc");
        assert_eq!(ex.query["api_key"], "abc");
    }

    #[test]
    fn into_test_case_sets_name_and_content_type() {
        let op = create_pet();
        let case = OperationExample::new("default", &op)
            .auto_complete(&op)
            .with_expected_status(201)
            .into_test_case("examples", vec!["createPet".into()], vec!["header".into()]);
        assert_eq!(case.name, "createPet/default");
        assert_eq!(case.operation_id, "createPet");
        assert_eq!(case.request.method, Method::Post);
        assert_eq!(case.request.headers["Content-Type"], "application/json");
        assert_eq!(case.expected_status(), Some(201));
        assert_eq!(case.excluded_fields, vec!["header"]);
    }

    #[test]
    fn fixture_shape_deserializes() {
        let ex: OperationExample = serde_json::from_value(json!({
            "name": "happy",
            "operation_id": "createPet",
            "method": "POST",
            "path": "/pets",
            "body": {"media_type": "application/json", "content": {"name": "rex"}},
            "response": {"status": 201}
        }))
        .unwrap();
        assert_eq!(ex.response.status, crate::testcase::StatusMatcher::Exact(201));
        assert!(ex.query.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn path_values_stay_in_one_segment(value in "\\PC{0,24}") {
            let op = Operation::new("getItem", Method::Get, "/items/{id}")
                .with_parameter(Parameter::new("id", ParameterIn::Path));
            let path = OperationExample::new("x", &op)
                .with_path_parameter("id", value.clone())
                .render_path();
            let segment = path.strip_prefix("/items/").unwrap_or_default();
            let escaped = !segment.contains(['/', '?', '#', ' ', '{']);
            proptest::prop_assert!(escaped, "segment {:?} not encoded", segment);
            let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
            proptest::prop_assert_eq!(decoded.as_ref(), value.as_str());
        }
    }
}
