//! JSON Schema → random `serde_json::Value` generator
//!
//! Handles the normalized schema subset the definition model carries:
//! string, integer, number, boolean, array, object, enum, anyOf, oneOf, allOf.
//! References are already resolved by the definition loader.

use rand::Rng;
use serde_json::{Value, json};

/// Maximum recursion depth for schema traversal.
const MAX_DEPTH: u32 = 20;

/// Maximum string length for generation (prevents OOM on absurd maxLength values).
const MAX_STRING_LEN: usize = 10_000;

/// Maximum array length for generation, whatever `minItems` asks for.
const MAX_ARRAY_LEN: usize = 100;

/// Generate a random JSON value conforming to the given JSON Schema.
pub fn generate(schema: &Value, rng: &mut impl Rng) -> Value {
    generate_inner(schema, rng, 0)
}

fn generate_inner(schema: &Value, rng: &mut impl Rng, depth: u32) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }

    // enum
    if let Some(enum_values) = schema.get("enum").and_then(|v| v.as_array()) {
        if !enum_values.is_empty() {
            return enum_values[rng.gen_range(0..enum_values.len())].clone();
        }
    }

    // anyOf / oneOf: pick one non-null variant
    for key in &["anyOf", "oneOf"] {
        if let Some(variants) = schema.get(*key).and_then(|v| v.as_array()) {
            let non_null: Vec<_> = variants
                .iter()
                .filter(|s| s.get("type").and_then(|t| t.as_str()) != Some("null"))
                .collect();
            if non_null.is_empty() {
                return Value::Null;
            }
            return generate_inner(non_null[rng.gen_range(0..non_null.len())], rng, depth + 1);
        }
    }

    // allOf: merge objects
    if let Some(all_of) = schema.get("allOf").and_then(|v| v.as_array()) {
        let mut merged = serde_json::Map::new();
        for sub in all_of {
            if let Value::Object(obj) = generate_inner(sub, rng, depth + 1) {
                merged.extend(obj);
            }
        }
        return Value::Object(merged);
    }

    let type_str = schema.get("type").and_then(|v| v.as_str()).unwrap_or("");
    match type_str {
        "string" => gen_string(schema, rng),
        "integer" => gen_integer(schema, rng),
        "number" => gen_number(schema, rng),
        "boolean" => Value::Bool(rng.gen_bool(0.5)),
        "array" => gen_array(schema, rng, depth + 1),
        "object" => gen_object(schema, rng, depth + 1),
        "null" => Value::Null,
        _ => {
            // Infer from structure
            if schema.get("properties").is_some() {
                gen_object(schema, rng, depth + 1)
            } else if schema.get("items").is_some() {
                gen_array(schema, rng, depth + 1)
            } else {
                Value::String(random_alnum(rng, 8))
            }
        }
    }
}

fn gen_string(schema: &Value, rng: &mut impl Rng) -> Value {
    let format = schema.get("format").and_then(|v| v.as_str());
    match format {
        Some("email") => Value::String(format!("user{}@example.com", rng.gen_range(1..9999_u32))),
        Some("uri" | "url") => Value::String("https://example.com".into()),
        Some("date") => Value::String(format!(
            "2024-{:02}-{:02}",
            rng.gen_range(1..=12_u32),
            rng.gen_range(1..=28_u32)
        )),
        Some("date-time") => Value::String(format!(
            "2024-01-15T{:02}:{:02}:00Z",
            rng.gen_range(0..24_u32),
            rng.gen_range(0..60_u32)
        )),
        Some("time") => Value::String(format!(
            "{:02}:{:02}:00",
            rng.gen_range(0..24_u32),
            rng.gen_range(0..60_u32)
        )),
        Some("ipv4") => Value::String(format!(
            "192.0.2.{}",
            rng.gen_range(1..=254_u32)
        )),
        Some("uuid") => Value::String(format!(
            "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
            rng.r#gen::<u32>(),
            rng.r#gen::<u16>(),
            rng.r#gen::<u16>() & 0x0FFF,
            (rng.r#gen::<u16>() & 0x3FFF) | 0x8000,
            rng.r#gen::<u64>() & 0xFFFF_FFFF_FFFF,
        )),
        _ => {
            let min = schema
                .get("minLength")
                .and_then(|v| v.as_u64())
                .map_or(1, |v| usize::try_from(v).unwrap_or(MAX_STRING_LEN).min(MAX_STRING_LEN));
            let max = schema
                .get("maxLength")
                .and_then(|v| v.as_u64())
                .map_or(20, |v| usize::try_from(v).unwrap_or(MAX_STRING_LEN).min(MAX_STRING_LEN));
            let len = rng.gen_range(min..=max.max(min));
            Value::String(random_alnum(rng, len))
        }
    }
}

fn gen_integer(schema: &Value, rng: &mut impl Rng) -> Value {
    let min = schema
        .get("minimum")
        .and_then(|v| v.as_i64())
        .unwrap_or(-1000);
    let max = schema
        .get("maximum")
        .and_then(|v| v.as_i64())
        .unwrap_or(1000);
    Value::Number(rng.gen_range(min..=max.max(min)).into())
}

fn gen_number(schema: &Value, rng: &mut impl Rng) -> Value {
    let min = schema
        .get("minimum")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let max = schema
        .get("maximum")
        .and_then(|v| v.as_f64())
        .unwrap_or(1000.0)
        .max(min);
    if (max - min).is_finite() {
        json!(rng.gen_range(min..=max))
    } else {
        // Width overflows f64; interpolate on halved bounds instead
        let t: f64 = rng.r#gen();
        json!(2.0 * (min / 2.0 + t * (max / 2.0 - min / 2.0)))
    }
}

fn gen_array(schema: &Value, rng: &mut impl Rng, depth: u32) -> Value {
    let min = schema
        .get("minItems")
        .and_then(|v| v.as_u64())
        .map_or(0, |v| usize::try_from(v).unwrap_or(MAX_ARRAY_LEN))
        .min(MAX_ARRAY_LEN);
    let max = schema
        .get("maxItems")
        .and_then(|v| v.as_u64())
        .map_or(3, |v| usize::try_from(v).unwrap_or(MAX_ARRAY_LEN))
        .min(MAX_ARRAY_LEN);
    let count = rng.gen_range(min..=max.max(min));
    let items_schema = schema
        .get("items")
        .cloned()
        .unwrap_or(json!({"type": "string"}));
    Value::Array(
        (0..count)
            .map(|_| generate_inner(&items_schema, rng, depth))
            .collect(),
    )
}

fn gen_object(schema: &Value, rng: &mut impl Rng, depth: u32) -> Value {
    let mut obj = serde_json::Map::new();
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if let Some(props) = schema.get("properties").and_then(|v| v.as_object()) {
        for (key, prop_schema) in props {
            if required.contains(&key.as_str()) || rng.gen_bool(0.5) {
                obj.insert(key.clone(), generate_inner(prop_schema, rng, depth));
            }
        }
    }
    Value::Object(obj)
}

fn random_alnum(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}
