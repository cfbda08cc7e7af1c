//! Typed accessors over normalized JSON Schema values
//!
//! Schemas are kept as `serde_json::Value`. The loader has already resolved
//! every `$ref`, so these helpers only walk plain objects.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Maximum recursion depth for schema traversal.
pub const MAX_DEPTH: u32 = 20;

/// Maximum string length when honoring `minLength`.
const MAX_STRING_LEN: usize = 1_000;

/// Primitive schema type after normalization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    pub const ALL: [SchemaType; 6] = [
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Array,
        Self::Object,
    ];

    /// Declared type of a schema.
    ///
    /// Falls back to structure (`properties` → object, `items` → array)
    /// when `type` is absent. `"null"` and unknown types yield `None`.
    #[must_use]
    pub fn of(schema: &Value) -> Option<Self> {
        match schema.get("type") {
            Some(Value::String(t)) => t.parse().ok(),
            // OpenAPI 3.1 style: ["integer", "null"]
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find_map(|t| t.parse().ok()),
            _ => {
                if schema.get("properties").is_some() {
                    Some(Self::Object)
                } else if schema.get("items").is_some() {
                    Some(Self::Array)
                } else {
                    None
                }
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown schema type '{s}'"))
    }
}

/// `format` keyword of a schema, if any.
#[must_use]
pub fn format(schema: &Value) -> Option<&str> {
    schema.get("format").and_then(Value::as_str)
}

/// Declared properties of an object schema, sorted by name.
#[must_use]
pub fn properties(schema: &Value) -> Vec<(&str, &Value)> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.iter().map(|(k, v)| (k.as_str(), v)).collect())
        .unwrap_or_default()
}

/// Names listed in the `required` keyword of an object schema.
#[must_use]
pub fn required_properties(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Produce a deterministic, schema-valid sample value.
///
/// Preference: `example`, `default`, first `enum` entry, then a fixed value
/// per type/format. Objects include every declared property so that
/// field-level strategies can address them in the sample.
#[must_use]
pub fn sample(schema: &Value) -> Value {
    sample_inner(schema, 0)
}

fn sample_inner(schema: &Value, depth: u32) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }

    if let Some(v) = schema.get("example") {
        return v.clone();
    }
    if let Some(v) = schema.get("default") {
        return v.clone();
    }
    if let Some(first) = schema
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
    {
        return first.clone();
    }

    for key in ["anyOf", "oneOf"] {
        if let Some(variants) = schema.get(key).and_then(Value::as_array) {
            return variants
                .iter()
                .find(|s| s.get("type").and_then(Value::as_str) != Some("null"))
                .map_or(Value::Null, |s| sample_inner(s, depth + 1));
        }
    }

    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        for sub in all_of {
            if let Value::Object(obj) = sample_inner(sub, depth + 1) {
                merged.extend(obj);
            }
        }
        return Value::Object(merged);
    }

    match SchemaType::of(schema) {
        Some(SchemaType::String) | None => sample_string(schema),
        Some(SchemaType::Integer) => sample_integer(schema),
        Some(SchemaType::Number) => sample_number(schema),
        Some(SchemaType::Boolean) => Value::Bool(true),
        Some(SchemaType::Array) => {
            let count = schema
                .get("minItems")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 10);
            let item = schema
                .get("items")
                .map_or_else(|| json!("string"), |items| sample_inner(items, depth + 1));
            Value::Array((0..count).map(|_| item.clone()).collect())
        }
        Some(SchemaType::Object) => {
            let obj: Map<String, Value> = properties(schema)
                .into_iter()
                .map(|(name, prop)| (name.to_string(), sample_inner(prop, depth + 1)))
                .collect();
            Value::Object(obj)
        }
    }
}

fn sample_string(schema: &Value) -> Value {
    let fixed = match format(schema) {
        Some("email") => Some("user@example.com"),
        Some("uuid") => Some("123e4567-e89b-12d3-a456-426614174000"),
        Some("date") => Some("2024-01-15"),
        Some("date-time") => Some("2024-01-15T12:00:00Z"),
        Some("time") => Some("12:00:00"),
        Some("uri" | "url") => Some("https://example.com"),
        Some("hostname") => Some("example.com"),
        Some("ipv4") => Some("192.0.2.1"),
        Some("ipv6") => Some("2001:db8::1"),
        Some("byte") => Some("c3RyaW5n"),
        _ => None,
    };
    if let Some(s) = fixed {
        return json!(s);
    }

    let mut s = String::from("string");
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        let min = usize::try_from(min).unwrap_or(MAX_STRING_LEN).min(MAX_STRING_LEN);
        while s.len() < min {
            s.push('s');
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        s.truncate(usize::try_from(max).unwrap_or(usize::MAX));
    }
    json!(s)
}

fn sample_integer(schema: &Value) -> Value {
    let min = schema.get("minimum").and_then(Value::as_i64);
    let max = schema.get("maximum").and_then(Value::as_i64);
    let value = match (min, max) {
        (Some(min), _) => min,
        (None, Some(max)) if max < 1 => max,
        _ => 1,
    };
    json!(value)
}

fn sample_number(schema: &Value) -> Value {
    let min = schema.get("minimum").and_then(Value::as_f64);
    let max = schema.get("maximum").and_then(Value::as_f64);
    let value = match (min, max) {
        (Some(min), _) => min,
        (None, Some(max)) if max < 1.5 => max,
        _ => 1.5,
    };
    json!(value)
}
