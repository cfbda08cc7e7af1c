//! 413 and 416: pagination ranges that are too large or unsatisfiable

use serde::Deserialize;

use apiprobe_core::{
    Operation, ParameterIn, PreparatorError, PreparatorOptions, TestCase, TokenPool,
};

use super::{CommonOptions, Preparator, base_example, parse_options};

pub(super) const TOO_LARGE: &str = "error413";
pub(super) const NOT_SATISFIABLE: &str = "error416";

/// Where an operation takes its pagination range
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "in", rename_all = "lowercase", deny_unknown_fields)]
pub enum RangeDescriptor {
    /// Two query parameters, e.g. `?offset=0&limit=10`
    Query {
        #[serde(rename = "lowerName")]
        lower_name: String,
        #[serde(rename = "upperName")]
        upper_name: String,
    },
    /// One header, e.g. `Range: items=0-10`
    Header { name: String, unit: String },
}

impl RangeDescriptor {
    #[must_use]
    pub fn query(lower_name: impl Into<String>, upper_name: impl Into<String>) -> Self {
        Self::Query {
            lower_name: lower_name.into(),
            upper_name: upper_name.into(),
        }
    }

    #[must_use]
    pub fn header(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            unit: unit.into(),
        }
    }

    /// Whether every parameter this descriptor names is declared on the operation.
    #[must_use]
    pub fn matches(&self, operation: &Operation) -> bool {
        match self {
            Self::Query {
                lower_name,
                upper_name,
            } => {
                operation.parameter(ParameterIn::Query, lower_name).is_some()
                    && operation.parameter(ParameterIn::Query, upper_name).is_some()
            }
            Self::Header { name, .. } => operation.parameter(ParameterIn::Header, name).is_some(),
        }
    }

    const fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RangeOptions {
    /// First descriptor matching an operation wins
    #[serde(default = "default_descriptors")]
    range: Vec<RangeDescriptor>,
}

fn default_descriptors() -> Vec<RangeDescriptor> {
    vec![
        RangeDescriptor::query("offset", "limit"),
        RangeDescriptor::header("Range", "items"),
    ]
}

/// (lower, upper) pair, with whether it applies to header ranges too.
type RangeValue = (&'static str, &'static str, bool);

const TOO_LARGE_VALUES: [RangeValue; 1] = [("0", "1000000000", true)];

const NOT_SATISFIABLE_VALUES: [RangeValue; 3] = [
    ("foo", "bar", true),
    ("10", "5", true),
    ("-1", "10", false),
];

/// One preparator per status: `too_large()` (413) or `not_satisfiable()` (416).
#[derive(Debug)]
pub struct RangeError {
    name: &'static str,
    status: u16,
    values: &'static [RangeValue],
    common: CommonOptions,
    descriptors: Vec<RangeDescriptor>,
}

impl RangeError {
    #[must_use]
    pub fn too_large() -> Self {
        Self {
            name: TOO_LARGE,
            status: 413,
            values: &TOO_LARGE_VALUES,
            common: CommonOptions::default(),
            descriptors: default_descriptors(),
        }
    }

    #[must_use]
    pub fn not_satisfiable() -> Self {
        Self {
            name: NOT_SATISFIABLE,
            status: 416,
            values: &NOT_SATISFIABLE_VALUES,
            common: CommonOptions::default(),
            descriptors: default_descriptors(),
        }
    }

    fn for_operation(&self, op: &Operation, descriptor: &RangeDescriptor) -> Vec<TestCase> {
        self.values
            .iter()
            .filter(|(_, _, header_too)| descriptor.is_query() || *header_too)
            .map(|(lower, upper, _)| {
                let example = match descriptor {
                    RangeDescriptor::Query {
                        lower_name,
                        upper_name,
                    } => base_example(format!("range@query:{lower}..{upper}"), op)
                        .with_query_parameter(lower_name, *lower)
                        .with_query_parameter(upper_name, *upper),
                    RangeDescriptor::Header { name, unit } => {
                        base_example(format!("range@header:{lower}..{upper}"), op)
                            .with_header(name, format!("{unit}={lower}-{upper}"))
                    }
                };
                self.common
                    .finish(example.with_expected_status(self.status), op, self.name)
            })
            .collect()
    }
}

impl Preparator for RangeError {
    fn name(&self) -> &'static str {
        self.name
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, specific): (CommonOptions, RangeOptions) = parse_options(self.name, options)?;
        self.common = common;
        self.descriptors = specific.range;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        _tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        let mut cases = Vec::new();
        for op in operations {
            match self.descriptors.iter().find(|d| d.matches(op)) {
                Some(descriptor) => cases.extend(self.for_operation(op, descriptor)),
                None => log::debug!("{}: no range descriptor matches {}", self.name, op.id),
            }
        }
        log::debug!("{}: {} cases", self.name, cases.len());
        Ok(cases)
    }
}
