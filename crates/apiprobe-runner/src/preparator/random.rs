//! Random: schema-shaped requests expected to avoid server errors

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use apiprobe_core::{
    ExpectedResponse, Operation, OperationExample, PreparatorError, PreparatorOptions,
    RequestBody, StatusMatcher, TestCase, TokenPool,
};

use super::{CommonOptions, Preparator, content_hash, operation_seed, parse_options};
use crate::datagen;

pub(super) const NAME: &str = "random";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RandomOptions {
    /// Attempts per operation; duplicates collapse
    #[serde(default = "default_cases_count")]
    cases_count: usize,
    #[serde(default)]
    seed: u64,
    /// Regex over the three-digit response status
    #[serde(default = "default_status_code")]
    status_code: String,
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self {
            cases_count: default_cases_count(),
            seed: 0,
            status_code: default_status_code(),
        }
    }
}

const fn default_cases_count() -> usize {
    10
}

fn default_status_code() -> String {
    "^[1-4][0-9]{2}$".to_string()
}

#[derive(Debug, Default)]
pub struct Random {
    common: CommonOptions,
    options: RandomOptions,
}

impl Preparator for Random {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, specific): (CommonOptions, RandomOptions) = parse_options(NAME, options)?;
        Regex::new(&specific.status_code).map_err(|e| {
            PreparatorError::invalid_config(NAME, format!("statusCode: {e}"))
        })?;
        self.common = common;
        self.options = specific;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        _tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        let mut cases = Vec::new();
        for op in operations {
            let mut rng = SmallRng::seed_from_u64(operation_seed(self.options.seed, &op.id));
            let mut seen = Vec::new();
            for _ in 0..self.options.cases_count {
                let example = self.random_example(op, &mut rng);
                let hash = content_hash(&(
                    example.method,
                    example.render_path(),
                    &example.headers,
                    &example.cookies,
                    &example.body,
                ));
                if seen.contains(&hash) {
                    continue;
                }
                let example = example.with_name(format!("{}_random", &hash[..8]));
                seen.push(hash);
                cases.push(self.common.finish(example, op, NAME));
            }
            log::debug!("{NAME}: {} distinct cases for {}", seen.len(), op.id);
        }
        Ok(cases)
    }
}

impl Random {
    fn random_example(&self, op: &Operation, rng: &mut SmallRng) -> OperationExample {
        let mut example = OperationExample::new(NAME, op);
        for param in &op.parameters {
            if param.is_required() || rng.gen_bool(0.5) {
                let value = datagen::generate(param.schema.as_ref().unwrap_or(&Value::Null), rng);
                example = example.with_parameter(param, &value);
            }
        }

        if !op.requests.is_empty() && (op.body_always_required() || rng.gen_bool(0.5)) {
            let request = &op.requests[rng.gen_range(0..op.requests.len())];
            let content = request
                .schema
                .as_ref()
                .map_or_else(|| request.representative_content(), |s| datagen::generate(s, rng));
            example = example.with_body(RequestBody::new(request.media_type.clone(), content));
        }

        let expected = ExpectedResponse {
            status: StatusMatcher::Pattern(self.options.status_code.clone()),
            ..ExpectedResponse::default()
        };
        example.with_response(expected).auto_complete(op)
    }
}
