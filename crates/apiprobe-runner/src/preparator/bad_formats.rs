//! 400: well-typed values that break the declared format

use serde_json::{Value, json};

use apiprobe_core::example::encode_value;
use apiprobe_core::{
    Operation, PreparatorError, PreparatorOptions, RequestBody, SchemaType, TestCase, TokenPool,
};

use super::fields::{body_fields, set_path};
use super::{CommonOptions, NoOptions, Preparator, base_example, parse_options, variant_suffix};

pub(super) const NAME: &str = "error400_bad_formats";

/// Invalid literal for a (type, format) pair, `None` when the pair is not covered.
#[must_use]
pub fn invalid_literal(schema_type: SchemaType, format: &str) -> Option<Value> {
    match (schema_type, format) {
        (
            SchemaType::String,
            "date" | "date-time" | "time" | "email" | "uuid" | "uri" | "ipv4" | "ipv6",
        ) => Some(json!("foo")),
        (SchemaType::Number, "float" | "double") => Some(json!(123)),
        (SchemaType::Integer, "int32") => Some(json!(50_000_000_000_000_i64)),
        (SchemaType::Integer, "int64") => Some(json!(5e22)),
        _ => None,
    }
}

/// String form of the invalid literal for parameter position.
#[must_use]
pub fn invalid_parameter_literal(schema_type: SchemaType, format: &str) -> Option<String> {
    match (schema_type, format) {
        // beyond i64, keep every digit instead of float notation
        (SchemaType::Integer, "int64") => Some("50000000000000000000000".to_string()),
        _ => invalid_literal(schema_type, format).map(|v| encode_value(&v)),
    }
}

#[derive(Debug, Default)]
pub struct BadFormats {
    common: CommonOptions,
}

impl Preparator for BadFormats {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, _): (CommonOptions, NoOptions) = parse_options(NAME, options)?;
        self.common = common;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        _tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        let cases: Vec<TestCase> = operations
            .iter()
            .flat_map(|op| self.for_operation(op))
            .collect();
        log::debug!("{NAME}: {} cases", cases.len());
        Ok(cases)
    }
}

impl BadFormats {
    fn for_operation(&self, op: &Operation) -> Vec<TestCase> {
        let mut cases = Vec::new();

        for param in op.required_parameters() {
            let (Some(schema_type), Some(format)) = (param.schema_type(), param.format()) else {
                continue;
            };
            let Some(literal) = invalid_parameter_literal(schema_type, format) else {
                log::debug!(
                    "{NAME}: {} {}.{}: no invalid literal for ({schema_type}, {format})",
                    op.id,
                    param.location,
                    param.name
                );
                continue;
            };
            let example = base_example(format!("bad_format@{}.{}", param.location, param.name), op)
                .with_raw_parameter(param.location, &param.name, literal)
                .with_expected_status(400);
            cases.push(self.common.finish(example, op, NAME));
        }

        for request in &op.requests {
            let Some(schema) = &request.schema else {
                continue;
            };
            let content = request.representative_content();
            let suffix = variant_suffix(op, request);
            for field in body_fields(schema, &content) {
                let (Some(schema_type), Some(format)) = (field.schema_type(), field.format()) else {
                    continue;
                };
                let Some(literal) = invalid_literal(schema_type, format) else {
                    continue;
                };
                let mut body = content.clone();
                if !set_path(&mut body, &field.path, literal) {
                    continue;
                }
                let example = base_example(format!("bad_format@body.{}{suffix}", field.dotted()), op)
                    .with_body(RequestBody::new(request.media_type.clone(), body))
                    .with_expected_status(400);
                cases.push(self.common.finish(example, op, NAME));
            }
        }

        cases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preparator::case_names;
    use apiprobe_core::{Method, Parameter, ParameterIn, Request};
    use proptest::prelude::*;

    fn prepare(ops: &[Operation]) -> Vec<TestCase> {
        BadFormats::default()
            .prepare(ops, &TokenPool::default())
            .unwrap()
    }

    #[test]
    fn table_literals() {
        assert_eq!(invalid_literal(SchemaType::String, "uuid"), Some(json!("foo")));
        assert_eq!(invalid_literal(SchemaType::Number, "double"), Some(json!(123)));
        assert_eq!(
            invalid_literal(SchemaType::Integer, "int32"),
            Some(json!(50_000_000_000_000_i64))
        );
        assert_eq!(invalid_literal(SchemaType::Integer, "int64"), Some(json!(5e22)));
        assert_eq!(invalid_literal(SchemaType::String, "password"), None);
        assert_eq!(invalid_literal(SchemaType::Integer, "float"), None);
        assert_eq!(
            invalid_parameter_literal(SchemaType::Integer, "int64").as_deref(),
            Some("50000000000000000000000")
        );
        assert_eq!(
            invalid_parameter_literal(SchemaType::Integer, "int32").as_deref(),
            Some("50000000000000")
        );
    }

    #[test]
    fn email_body_field_replaced() {
        let op = Operation::new("postTest", Method::Post, "/test").with_request(
            Request::new(
                "application/json",
                json!({
                    "type": "object",
                    "required": ["foo"],
                    "properties": {"foo": {"type": "string", "format": "email"}}
                }),
            )
            .with_required(true)
            .with_example("default", json!({"foo": "foo@bar.com"})),
        );
        let cases = prepare(&[op]);
        insta::assert_snapshot!(case_names(&cases), @"postTest/bad_format@body.foo");
        assert_eq!(
            cases[0].request.body.as_ref().unwrap().content,
            json!({"foo": "foo"})
        );
        assert_eq!(cases[0].expected_status(), Some(400));
    }

    #[test]
    fn required_parameters_with_known_pairs_only() {
        let op = Operation::new("getItem", Method::Get, "/items/{id}")
            .with_parameter(
                Parameter::new("id", ParameterIn::Path)
                    .with_schema(json!({"type": "integer", "format": "int64"})),
            )
            .with_parameter(
                Parameter::new("since", ParameterIn::Query)
                    .with_required(true)
                    .with_schema(json!({"type": "string", "format": "date"})),
            )
            .with_parameter(
                Parameter::new("secret", ParameterIn::Query)
                    .with_required(true)
                    .with_schema(json!({"type": "string", "format": "password"})),
            )
            .with_parameter(
                Parameter::new("until", ParameterIn::Query)
                    .with_schema(json!({"type": "string", "format": "date"})),
            );
        let cases = prepare(&[op]);
        insta::assert_snapshot!(case_names(&cases), @r"
        getItem/bad_format@path.id
        getItem/bad_format@query.since
        ");
        assert!(
            cases[0]
                .request
                .path
                .starts_with("/items/50000000000000000000000?")
        );
        assert!(cases[1].request.path.contains("since=foo"));
    }

    proptest! {
        #[test]
        fn literals_are_deterministic(idx in 0usize..6, format in "[a-z0-9-]{1,10}") {
            let schema_type = SchemaType::ALL[idx];
            prop_assert_eq!(
                invalid_literal(schema_type, &format),
                invalid_literal(schema_type, &format)
            );
            if let Some(v) = invalid_literal(schema_type, &format) {
                prop_assert!(invalid_parameter_literal(schema_type, &format).is_some());
                prop_assert!(matches!(schema_type, SchemaType::String | SchemaType::Number | SchemaType::Integer));
                prop_assert!(!v.is_null());
            }
        }
    }
}
