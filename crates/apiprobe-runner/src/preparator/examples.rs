//! Positive paths built from declared and fixture-provided examples
//!
//! Request examples (parameters and bodies) and response examples are tied
//! together by name. A request named `N` takes the response carrying `N`,
//! then `N_200`, then `N_201`, then the first declared response.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use apiprobe_core::definition::DEFAULT_EXAMPLE;
use apiprobe_core::example::encode_value;
use apiprobe_core::{
    BodyMatcher, ExpectedResponse, Operation, OperationExample, PreparatorError,
    PreparatorOptions, RequestBody, Response, TestCase, TokenPool,
};

use super::{CommonOptions, Preparator, parse_options};
use crate::fixtures::{Fixtures, load_fixtures};

pub(super) const NAME: &str = "examples";

const STATUS_SUFFIXES: [&str; 2] = ["200", "201"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExamplesOptions {
    #[serde(default)]
    fixtures: Fixtures,
    /// YAML or JSON fixture file; entries override inline ones by name
    #[serde(default)]
    fixtures_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Examples {
    common: CommonOptions,
    fixtures: Fixtures,
}

impl Preparator for Examples {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, specific): (CommonOptions, ExamplesOptions) = parse_options(NAME, options)?;
        let mut fixtures = specific.fixtures;
        if let Some(path) = &specific.fixtures_path {
            let loaded =
                load_fixtures(path).map_err(|e| PreparatorError::loading(NAME, e.to_string()))?;
            fixtures.extend(loaded);
        }
        self.common = common;
        self.fixtures = fixtures;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        _tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        if let Some((name, fixture)) = self
            .fixtures
            .iter()
            .find(|(_, f)| !operations.iter().any(|op| op.id == f.operation_id))
        {
            return Err(PreparatorError::logic(
                NAME,
                format!(
                    "fixture '{name}' references unknown operation '{}'",
                    fixture.operation_id
                ),
            ));
        }

        let mut cases = Vec::new();
        for op in operations {
            let mut merged: IndexMap<String, OperationExample> = declared_examples(op)
                .into_iter()
                .map(|ex| (ex.name.clone(), ex))
                .collect();
            for example in &op.examples {
                merged.insert(example.name.clone(), example.clone());
            }
            for (name, fixture) in self.fixtures.iter().filter(|(_, f)| f.operation_id == op.id) {
                log::debug!("{NAME}: fixture '{name}' attached to {}", op.id);
                merged.insert(name.clone(), fixture.to_example(name, op));
            }
            cases.extend(
                merged
                    .into_values()
                    .map(|example| self.common.finish(example, op, NAME)),
            );
        }
        log::debug!("{NAME}: {} cases", cases.len());
        Ok(cases)
    }
}

/// Examples assembled from the definition's named example values.
fn declared_examples(op: &Operation) -> Vec<OperationExample> {
    if op.responses.is_empty() {
        return Vec::new();
    }
    let mut names = request_example_names(op);
    if names.is_empty() && op.responses.iter().any(|r| !r.example_names().is_empty()) {
        names.push(DEFAULT_EXAMPLE);
    }
    names
        .into_iter()
        .filter_map(|name| {
            let (response, key) = resolve_response(op, name)?;
            Some(build_example(op, name, response, key))
        })
        .collect()
}

fn request_example_names(op: &Operation) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let from_parameters = op.parameters.iter().flat_map(|p| p.examples.keys());
    let from_bodies = op.requests.iter().flat_map(|r| r.examples.keys());
    for name in from_parameters.chain(from_bodies) {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }
    names
}

/// The response paired with a request example, and the example key to read from it.
fn resolve_response<'a>(op: &'a Operation, name: &str) -> Option<(&'a Response, Option<String>)> {
    let mut keys = vec![name.to_string()];
    keys.extend(STATUS_SUFFIXES.iter().map(|s| format!("{name}_{s}")));
    for key in keys {
        if let Some(response) = op.responses.iter().find(|r| r.has_example(&key)) {
            return Some((response, Some(key)));
        }
    }
    op.responses.first().map(|r| (r, None))
}

fn build_example(
    op: &Operation,
    name: &str,
    response: &Response,
    key: Option<String>,
) -> OperationExample {
    let mut example = OperationExample::new(name, op);
    for param in &op.parameters {
        if let Some(value) = param.examples.get(name) {
            example = example.with_parameter(param, value);
        }
    }
    if let Some((request, content)) = op
        .requests
        .iter()
        .find_map(|r| r.examples.get(name).map(|c| (r, c)))
    {
        example = example.with_body(RequestBody::new(request.media_type.clone(), content.clone()));
    }

    let mut expected = ExpectedResponse::status(response.status_code);
    if let Some(key) = key.as_deref() {
        for header in &response.headers {
            if let Some(value) = header.examples.get(key) {
                expected = expected.with_header(header.name.clone(), encode_value(value));
            }
        }
        if let Some(body) = response.examples.get(key) {
            expected = expected.with_body(BodyMatcher::Json(body.clone()));
        }
    }

    example.with_response(expected).auto_complete(op)
}
