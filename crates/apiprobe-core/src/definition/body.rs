use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parameter::{Examples, Parameter, representative};

/// A request body variant, keyed by media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: Examples,
}

impl Request {
    #[must_use]
    pub fn new(media_type: impl Into<String>, schema: Value) -> Self {
        Self {
            media_type: media_type.into(),
            schema: Some(schema),
            required: false,
            examples: Examples::new(),
        }
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_example(mut self, name: impl Into<String>, value: Value) -> Self {
        self.examples.insert(name.into(), value);
        self
    }

    /// Representative body content (see [`representative`]).
    #[must_use]
    pub fn representative_content(&self) -> Value {
        representative(&self.examples, self.schema.as_ref())
    }
}

/// A declared response, keyed by status code (and media type when several exist)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: Examples,
}

impl Response {
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            media_type: None,
            description: String::new(),
            schema: None,
            headers: Vec::new(),
            examples: Examples::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_content(mut self, media_type: impl Into<String>, schema: Value) -> Self {
        self.media_type = Some(media_type.into());
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: Parameter) -> Self {
        self.headers.push(header);
        self
    }

    #[must_use]
    pub fn with_example(mut self, name: impl Into<String>, value: Value) -> Self {
        self.examples.insert(name.into(), value);
        self
    }

    /// Example names carried by the body or any header, first-appearance order.
    #[must_use]
    pub fn example_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let header_names = self.headers.iter().flat_map(|h| h.examples.keys());
        for name in self.examples.keys().chain(header_names) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Whether this response carries an example with the given name.
    #[must_use]
    pub fn has_example(&self, name: &str) -> bool {
        self.examples.contains_key(name) || self.headers.iter().any(|h| h.examples.contains_key(name))
    }
}

fn default_media_type() -> String {
    "application/json".to_string()
}
