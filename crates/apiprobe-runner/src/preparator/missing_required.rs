//! 400: one required field left out at a time

use apiprobe_core::{Operation, PreparatorError, PreparatorOptions, RequestBody, TestCase, TokenPool};

use super::fields::{body_fields, remove_path};
use super::{CommonOptions, NoOptions, Preparator, base_example, parse_options, variant_suffix};

pub(super) const NAME: &str = "error400_missing_required_fields";

/// Omits each required non-path parameter, each required body field, and
/// the whole body when every body variant is required.
#[derive(Debug, Default)]
pub struct MissingRequiredFields {
    common: CommonOptions,
}

impl Preparator for MissingRequiredFields {
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

impl MissingRequiredFields {
    fn for_operation(&self, op: &Operation) -> Vec<TestCase> {
        let mut cases = Vec::new();

        // path parameters route the request and cannot be missing
        for param in op.required_parameters().filter(|p| !p.is_path()) {
            let example = base_example(format!("missing@{}.{}", param.location, param.name), op)
                .without_parameter(param)
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
                if !field.required || !field.is_present(&content) {
                    continue;
                }
                let mut body = content.clone();
                remove_path(&mut body, &field.path);
                let example = base_example(format!("missing@body.{}{suffix}", field.dotted()), op)
                    .with_body(RequestBody::new(request.media_type.clone(), body))
                    .with_expected_status(400);
                cases.push(self.common.finish(example, op, NAME));
            }
        }

        if op.body_always_required() {
            let example = base_example("missing@body", op)
                .without_body()
                .with_expected_status(400);
            cases.push(self.common.finish(example, op, NAME));
        }

        cases
    }
}
