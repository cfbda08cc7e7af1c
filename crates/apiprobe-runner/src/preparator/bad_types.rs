//! 400: values of the wrong JSON type

use serde_json::{Value, json};

use apiprobe_core::{
    Operation, PreparatorError, PreparatorOptions, RequestBody, SchemaType, TestCase, TokenPool,
};

use super::fields::{body_fields, set_path};
use super::{CommonOptions, NoOptions, Preparator, base_example, parse_options, variant_suffix};

pub(super) const NAME: &str = "error400_bad_types";

/// Objects cannot be expressed in path, query or header position.
const PARAMETER_CANDIDATES: [SchemaType; 5] = [
    SchemaType::String,
    SchemaType::Number,
    SchemaType::Integer,
    SchemaType::Boolean,
    SchemaType::Array,
];

/// Canonical literal for each wrong type.
#[must_use]
pub fn substitute(schema_type: SchemaType) -> Value {
    match schema_type {
        SchemaType::String => json!("foo"),
        SchemaType::Number => json!(1.234),
        SchemaType::Integer => json!(5),
        SchemaType::Boolean => json!(true),
        SchemaType::Array => json!(["foo", "bar"]),
        SchemaType::Object => json!({"foo": "bar"}),
    }
}

#[derive(Debug, Default)]
pub struct BadTypes {
    common: CommonOptions,
}

impl Preparator for BadTypes {
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

impl BadTypes {
    fn for_operation(&self, op: &Operation) -> Vec<TestCase> {
        let mut cases = Vec::new();

        for param in op.required_parameters() {
            // untyped and string parameters accept any literal
            let Some(own) = param.schema_type().filter(|t| *t != SchemaType::String) else {
                continue;
            };
            for candidate in PARAMETER_CANDIDATES.into_iter().filter(|c| *c != own) {
                let example = base_example(
                    format!("bad_type_{candidate}@{}.{}", param.location, param.name),
                    op,
                )
                .with_parameter(param, &substitute(candidate))
                .with_expected_status(400);
                cases.push(self.common.finish(example, op, NAME));
            }
        }

        for request in &op.requests {
            let Some(schema) = &request.schema else {
                continue;
            };
            let content = request.representative_content();
            let suffix = variant_suffix(op, request);
            for field in body_fields(schema, &content) {
                let Some(own) = field.schema_type() else {
                    continue;
                };
                for candidate in SchemaType::ALL.into_iter().filter(|c| *c != own) {
                    let mut body = content.clone();
                    if !set_path(&mut body, &field.path, substitute(candidate)) {
                        continue;
                    }
                    let example = base_example(
                        format!("bad_type_{candidate}@body.{}{suffix}", field.dotted()),
                        op,
                    )
                    .with_body(RequestBody::new(request.media_type.clone(), body))
                    .with_expected_status(400);
                    cases.push(self.common.finish(example, op, NAME));
                }
            }
        }

        cases
    }
}
