use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{self, SchemaType};

/// Name of the example that stands for "the" scenario of a component.
pub const DEFAULT_EXAMPLE: &str = "default";

/// Named example values. The same name across parameters, bodies and
/// responses ties them into one scenario.
pub type Examples = IndexMap<String, Value>;

/// Where a parameter lives in the request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterIn {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for ParameterIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path, query, header or cookie parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: Examples,
}

impl Parameter {
    /// Path parameters are always required.
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParameterIn) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParameterIn::Path,
            schema: None,
            examples: Examples::new(),
        }
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_example(mut self, name: impl Into<String>, value: Value) -> Self {
        self.examples.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn is_path(&self) -> bool {
        self.location == ParameterIn::Path
    }

    /// Path parameters count as required whatever the loader recorded.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required || self.is_path()
    }

    #[must_use]
    pub fn schema_type(&self) -> Option<SchemaType> {
        self.schema.as_ref().and_then(SchemaType::of)
    }

    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.schema.as_ref().and_then(schema::format)
    }

    /// Value used when the parameter must be present but no scenario picks it.
    #[must_use]
    pub fn representative_value(&self) -> Value {
        representative(&self.examples, self.schema.as_ref())
    }

    /// Same parameter identity: name (case-insensitive for headers) and location.
    #[must_use]
    pub fn same_as(&self, other: &Parameter) -> bool {
        self.location == other.location
            && if self.location == ParameterIn::Header {
                self.name.eq_ignore_ascii_case(&other.name)
            } else {
                self.name == other.name
            }
    }
}

/// Pick a representative value: the `default` example, the first named
/// example, or a deterministic sample of the schema.
#[must_use]
pub fn representative(examples: &Examples, schema: Option<&Value>) -> Value {
    examples
        .get(DEFAULT_EXAMPLE)
        .or_else(|| examples.values().next())
        .cloned()
        .unwrap_or_else(|| schema.map_or_else(|| schema::sample(&Value::Null), schema::sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_parameters_default_to_required() {
        assert!(Parameter::new("id", ParameterIn::Path).required);
        assert!(!Parameter::new("q", ParameterIn::Query).required);
    }

    #[test]
    fn representative_prefers_default_example() {
        let p = Parameter::new("limit", ParameterIn::Query)
            .with_schema(json!({"type": "integer"}))
            .with_example("first", json!(5))
            .with_example("default", json!(10));
        assert_eq!(p.representative_value(), json!(10));
    }

    #[test]
    fn representative_falls_back_to_first_example_then_schema() {
        let p = Parameter::new("limit", ParameterIn::Query)
            .with_schema(json!({"type": "integer"}))
            .with_example("first", json!(5));
        assert_eq!(p.representative_value(), json!(5));

        let p = Parameter::new("limit", ParameterIn::Query)
            .with_schema(json!({"type": "integer", "minimum": 3}));
        assert_eq!(p.representative_value(), json!(3));

        let p = Parameter::new("raw", ParameterIn::Query);
        assert_eq!(p.representative_value(), json!("string"));
    }

    #[test]
    fn header_identity_is_case_insensitive() {
        let a = Parameter::new("X-Trace", ParameterIn::Header);
        let b = Parameter::new("x-trace", ParameterIn::Header);
        let c = Parameter::new("x-trace", ParameterIn::Query);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn deserializes_with_in_keyword() {
        let p: Parameter = serde_json::from_value(json!({
            "name": "foo_query",
            "in": "query",
            "required": true,
            "schema": {"type": "integer"},
            "examples": {"default": 3}
        }))
        .unwrap();
        assert_eq!(p.location, ParameterIn::Query);
        assert_eq!(p.schema_type(), Some(SchemaType::Integer));
        assert_eq!(p.examples["default"], json!(3));
    }
}
