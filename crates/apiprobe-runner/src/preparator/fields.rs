//! Body field traversal by dot path

use serde_json::Value;

use apiprobe_core::SchemaType;
use apiprobe_core::definition::schema::{self, MAX_DEPTH};

/// One property of a body schema, addressed from the body root
pub(crate) struct BodyField<'a> {
    pub path: Vec<&'a str>,
    pub schema: &'a Value,
    /// Listed in the parent's `required` keyword
    pub required: bool,
}

impl BodyField<'_> {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    pub fn schema_type(&self) -> Option<SchemaType> {
        SchemaType::of(self.schema)
    }

    pub fn format(&self) -> Option<&str> {
        schema::format(self.schema)
    }

    /// Whether `content` holds a value at this path.
    pub fn is_present(&self, content: &Value) -> bool {
        get_path(content, &self.path).is_some()
    }
}

/// Properties of `body_schema` sorted by name, depth first. Nested object
/// properties are listed only where `content` carries that object.
pub(crate) fn body_fields<'a>(body_schema: &'a Value, content: &Value) -> Vec<BodyField<'a>> {
    let mut fields = Vec::new();
    collect(body_schema, content, &mut Vec::new(), &mut fields, 0);
    fields
}

fn collect<'a>(
    object_schema: &'a Value,
    content: &Value,
    prefix: &mut Vec<&'a str>,
    out: &mut Vec<BodyField<'a>>,
    depth: u32,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let required = schema::required_properties(object_schema);
    for (name, prop) in schema::properties(object_schema) {
        prefix.push(name);
        out.push(BodyField {
            path: prefix.clone(),
            schema: prop,
            required: required.contains(&name),
        });
        if SchemaType::of(prop) == Some(SchemaType::Object) {
            if let Some(nested) = content.get(name).filter(|v| v.is_object()) {
                collect(prop, nested, prefix, out, depth + 1);
            }
        }
        prefix.pop();
    }
}

pub(crate) fn get_path<'v>(content: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(content, |node, key| node.get(*key))
}

/// Set the value at `path`; the parent object must exist.
pub(crate) fn set_path(content: &mut Value, path: &[&str], value: Value) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    let mut node = content;
    for key in parents {
        match node.get_mut(*key) {
            Some(next) => node = next,
            None => return false,
        }
    }
    match node.as_object_mut() {
        Some(obj) => {
            obj.insert((*last).to_string(), value);
            true
        }
        None => false,
    }
}

/// Remove the value at `path`, returning whether something was removed.
pub(crate) fn remove_path(content: &mut Value, path: &[&str]) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    let mut node = content;
    for key in parents {
        match node.get_mut(*key) {
            Some(next) => node = next,
            None => return false,
        }
    }
    node.as_object_mut()
        .is_some_and(|obj| obj.remove(*last).is_some())
}
