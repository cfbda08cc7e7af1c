//! 406: `Accept` media types no response declares

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use apiprobe_core::{Operation, PreparatorError, PreparatorOptions, TestCase, TokenPool};

use super::{CommonOptions, Preparator, base_example, operation_seed, parse_options};

pub(super) const NAME: &str = "error406";

const DEFAULT_MEDIA_TYPES: [&str; 10] = [
    "application/json",
    "application/xml",
    "application/pdf",
    "application/zip",
    "application/octet-stream",
    "text/plain",
    "text/html",
    "text/csv",
    "image/png",
    "image/jpeg",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NotAcceptableOptions {
    #[serde(default = "default_media_types")]
    media_types: Vec<String>,
    /// Types tried per operation
    #[serde(default = "default_count")]
    count: usize,
    #[serde(default)]
    seed: u64,
}

impl Default for NotAcceptableOptions {
    fn default() -> Self {
        Self {
            media_types: default_media_types(),
            count: default_count(),
            seed: 0,
        }
    }
}

fn default_media_types() -> Vec<String> {
    DEFAULT_MEDIA_TYPES.iter().map(ToString::to_string).collect()
}

const fn default_count() -> usize {
    3
}

#[derive(Debug, Default)]
pub struct NotAcceptable {
    common: CommonOptions,
    options: NotAcceptableOptions,
}

impl Preparator for NotAcceptable {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, specific) = parse_options(NAME, options)?;
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
            for media_type in self.select(op) {
                let example = base_example(format!("not_acceptable@{media_type}"), op)
                    .with_header("Accept", media_type.as_str())
                    .with_expected_status(406);
                cases.push(self.common.finish(example, op, NAME));
            }
        }
        log::debug!("{NAME}: {} cases", cases.len());
        Ok(cases)
    }
}

impl NotAcceptable {
    /// Undeclared pool entries: seeded shuffle, first `count`, sorted.
    fn select(&self, op: &Operation) -> Vec<String> {
        let declared = op.response_media_types();
        if declared.is_empty() {
            log::debug!("{NAME}: {} declares no response media type", op.id);
            return Vec::new();
        }

        let mut candidates: Vec<String> = Vec::new();
        for media_type in &self.options.media_types {
            let taken = declared
                .iter()
                .any(|d| d.eq_ignore_ascii_case(media_type));
            if !taken && !candidates.contains(media_type) {
                candidates.push(media_type.clone());
            }
        }

        let mut rng = SmallRng::seed_from_u64(operation_seed(self.options.seed, &op.id));
        candidates.shuffle(&mut rng);
        candidates.truncate(self.options.count);
        candidates.sort();
        candidates
    }
}
