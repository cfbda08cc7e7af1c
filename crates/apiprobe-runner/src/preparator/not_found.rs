//! 404: requests aimed at resources that cannot exist

use apiprobe_core::{
    BodyMatcher, Operation, OperationExample, PreparatorError, PreparatorOptions, TestCase,
    TokenPool,
};

use super::{
    CommonOptions, NoOptions, Preparator, base_example, parse_options, variant_suffix,
    with_variant_body,
};

pub(super) const NAME: &str = "error404";

/// Out-of-range identifier placed in every path parameter.
pub const SENTINEL: &str = "2147483647";

#[derive(Debug, Default)]
pub struct NotFound {
    common: CommonOptions,
}

impl Preparator for NotFound {
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
            .filter(|op| op.has_response(404))
            .flat_map(|op| self.for_operation(op))
            .collect();
        log::debug!("{NAME}: {} cases", cases.len());
        Ok(cases)
    }
}

impl NotFound {
    fn for_operation(&self, op: &Operation) -> Vec<TestCase> {
        let description = op
            .responses_with_status(404)
            .map(|r| r.description.as_str())
            .find(|d| !d.is_empty());
        let expecting = |example: OperationExample| {
            let example = example.with_expected_status(404);
            match description {
                Some(text) => example.with_expected_body(BodyMatcher::Text(text.to_string())),
                None => example,
            }
        };

        if op.path_parameters().next().is_some() {
            let example = op
                .path_parameters()
                .fold(base_example("not_found", op), |ex, p| {
                    ex.with_path_parameter(&p.name, SENTINEL)
                })
                .without_body();
            return vec![self.common.finish(expecting(example), op, NAME)];
        }

        op.requests
            .iter()
            .map(|request| {
                let name = format!("not_found{}", variant_suffix(op, request));
                let example = with_variant_body(base_example(name, op), request);
                self.common.finish(expecting(example), op, NAME)
            })
            .collect()
    }
}
