//! Preparators: strategies that turn operations into test cases
//!
//! Every preparator is configured once from a flat option map, then
//! `prepare` is a pure function of the operations, its configuration and
//! the token pool: the same inputs always yield the same ordered cases.
//!
//! Options shared by all preparators (`excludedFields`, `schemaValidation`)
//! are split off before the strategy parses its own keys strictly.

mod bad_formats;
mod bad_types;
mod examples;
pub(crate) mod fields;
mod method_not_allowed;
mod missing_required;
mod not_acceptable;
mod not_found;
mod random;
mod range;
mod security;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use apiprobe_core::{
    BodyMatcher, Operation, OperationExample, PreparatorError, PreparatorOptions, Request,
    RequestBody, TestCase, TokenPool,
};

pub use bad_formats::BadFormats;
pub use bad_types::BadTypes;
pub use examples::Examples;
pub use method_not_allowed::MethodNotAllowed;
pub use missing_required::MissingRequiredFields;
pub use not_acceptable::NotAcceptable;
pub use not_found::NotFound;
pub use random::Random;
pub use range::{RangeDescriptor, RangeError};
pub use security::{Forbidden, Unauthorized};

/// A test case generation strategy
pub trait Preparator {
    /// Stable name, also added to every emitted case's groups.
    fn name(&self) -> &'static str;

    /// Validate and apply options.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on unknown or malformed keys; `Loading` when an
    /// external fixture cannot be read.
    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError>;

    /// Generate test cases for `operations`.
    ///
    /// # Errors
    ///
    /// `Logic` when the fixture set cannot exercise this strategy.
    fn prepare(
        &self,
        operations: &[Operation],
        tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError>;
}

// ── Registry ──

/// Preparator names in registry order.
pub const NAMES: [&str; 12] = [
    missing_required::NAME,
    bad_types::NAME,
    bad_formats::NAME,
    security::UNAUTHORIZED,
    security::FORBIDDEN,
    not_found::NAME,
    method_not_allowed::NAME,
    not_acceptable::NAME,
    range::TOO_LARGE,
    range::NOT_SATISFIABLE,
    examples::NAME,
    random::NAME,
];

/// Every preparator with default options, in registry order.
#[must_use]
pub fn all() -> Vec<Box<dyn Preparator>> {
    vec![
        Box::new(MissingRequiredFields::default()),
        Box::new(BadTypes::default()),
        Box::new(BadFormats::default()),
        Box::new(Unauthorized::default()),
        Box::new(Forbidden::default()),
        Box::new(NotFound::default()),
        Box::new(MethodNotAllowed::default()),
        Box::new(NotAcceptable::default()),
        Box::new(RangeError::too_large()),
        Box::new(RangeError::not_satisfiable()),
        Box::new(Examples::default()),
        Box::new(Random::default()),
    ]
}

/// Look a preparator up by name.
///
/// # Errors
///
/// `InvalidConfig` when no preparator has this name.
pub fn by_name(name: &str) -> Result<Box<dyn Preparator>, PreparatorError> {
    all()
        .into_iter()
        .find(|p| p.name() == name)
        .ok_or_else(|| {
            PreparatorError::invalid_config(
                name,
                format!("unknown preparator (expected one of: {})", NAMES.join(", ")),
            )
        })
}

// ── Options ──

const COMMON_KEYS: [&str; 2] = ["excludedFields", "schemaValidation"];

/// Options every preparator accepts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommonOptions {
    /// Copied into every emitted case: `header`, `body` or `body.<path>`
    #[serde(default)]
    pub excluded_fields: Vec<String>,
    /// Expect a schema match when the expected status declares a schema
    #[serde(default)]
    pub schema_validation: bool,
}

/// For preparators without options of their own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NoOptions {}

/// Split common keys off, then parse the rest strictly into `T`.
pub(crate) fn parse_options<T: DeserializeOwned>(
    preparator: &str,
    options: &PreparatorOptions,
) -> Result<(CommonOptions, T), PreparatorError> {
    let mut rest = options.clone();
    let mut common = Map::new();
    for key in COMMON_KEYS {
        if let Some(value) = rest.remove(key) {
            common.insert(key.to_string(), value);
        }
    }
    let invalid = |e: serde_json::Error| PreparatorError::invalid_config(preparator, e.to_string());
    let common = serde_json::from_value(Value::Object(common)).map_err(invalid)?;
    let specific = serde_json::from_value(Value::Object(rest)).map_err(invalid)?;
    Ok((common, specific))
}

impl CommonOptions {
    /// Freeze an example into a case carrying this preparator's groups and
    /// exclusions, upgrading the body expectation to a schema match when
    /// schema validation is on.
    #[must_use]
    pub fn finish(
        &self,
        example: OperationExample,
        operation: &Operation,
        preparator: &str,
    ) -> TestCase {
        let mut groups = operation.labels();
        groups.push(preparator.to_string());
        let mut case = example.into_test_case(preparator, groups, self.excluded_fields.clone());

        if self.schema_validation && case.expected.body.is_none() {
            let schema = case.expected_status().and_then(|code| {
                operation
                    .responses_with_status(code)
                    .find_map(|r| r.schema.clone())
            });
            if let Some(schema) = schema {
                case.expected.body = Some(BodyMatcher::Schema(schema));
            }
        }
        case
    }
}

// ── Shared builders ──

/// Example with every required parameter (and an always-required body) filled.
pub(crate) fn base_example(name: impl Into<String>, operation: &Operation) -> OperationExample {
    OperationExample::new(name, operation).auto_complete(operation)
}

/// Example carrying a representative body for `request`.
pub(crate) fn with_variant_body(example: OperationExample, request: &Request) -> OperationExample {
    example.with_body(RequestBody::new(
        request.media_type.clone(),
        request.representative_content(),
    ))
}

/// Case-name suffix distinguishing body variants when several exist.
pub(crate) fn variant_suffix(operation: &Operation, request: &Request) -> String {
    if operation.requests.len() > 1 {
        format!("[{}]", request.media_type)
    } else {
        String::new()
    }
}

/// Per-operation RNG seed: stable across runs and independent of operation order.
pub(crate) fn operation_seed(seed: u64, operation_id: &str) -> u64 {
    let digest = Sha256::digest(operation_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    seed ^ u64::from_le_bytes(bytes)
}

/// Hex SHA-256 of a value's JSON serialization.
pub(crate) fn content_hash(value: &impl Serialize) -> String {
    let json = serde_json::to_string(value).unwrap_or_default();
    hex::encode(Sha256::digest(json.as_bytes()))
}

#[cfg(test)]
pub(crate) fn case_names(cases: &[TestCase]) -> String {
    cases
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) fn options_from(value: Value) -> PreparatorOptions {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_core::{ErrorKind, Method, Response, StatusMatcher};
    use serde_json::json;

    #[test]
    fn registry_order_and_names_agree() {
        let names: Vec<_> = all().iter().map(|p| p.name()).collect();
        assert_eq!(names, NAMES.to_vec());
    }

    #[test]
    fn by_name_finds_and_rejects() {
        assert_eq!(by_name("error405").unwrap().name(), "error405");
        let err = by_name("error999").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn common_options_are_split_off() {
        let (common, _): (CommonOptions, NoOptions) = parse_options(
            "error404",
            &options_from(json!({"excludedFields": ["header"], "schemaValidation": true})),
        )
        .unwrap();
        assert_eq!(common.excluded_fields, vec!["header"]);
        assert!(common.schema_validation);
    }

    #[test]
    fn unknown_keys_are_invalid_config() {
        let err = parse_options::<NoOptions>("error404", &options_from(json!({"foo": 1})))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn malformed_common_option_is_invalid_config() {
        let err = parse_options::<NoOptions>(
            "error404",
            &options_from(json!({"excludedFields": "header"})),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn every_preparator_rejects_unknown_keys() {
        for mut preparator in all() {
            let err = preparator
                .configure(&options_from(json!({"definitelyNotAnOption": true})))
                .err()
                .unwrap();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{}", preparator.name());
        }
    }

    #[test]
    fn every_preparator_accepts_empty_options() {
        for mut preparator in all() {
            assert!(preparator.configure(&Map::new()).is_ok(), "{}", preparator.name());
        }
    }

    #[test]
    fn operation_seed_depends_on_id_and_seed() {
        assert_eq!(operation_seed(0, "getPet"), operation_seed(0, "getPet"));
        assert_ne!(operation_seed(0, "getPet"), operation_seed(0, "listPets"));
        assert_ne!(operation_seed(0, "getPet"), operation_seed(1, "getPet"));
    }

    #[test]
    fn content_hash_is_hex_sha256() {
        let h = content_hash(&json!({"a": 1}));
        assert_eq!(h.len(), 64);
        assert_eq!(h, content_hash(&json!({"a": 1})));
    }

    #[test]
    fn finish_adds_groups_and_schema_matcher() {
        let op = Operation::new("getPet", Method::Get, "/pets")
            .with_tag("pets")
            .with_response(
                Response::new(404).with_content("application/json", json!({"type": "object"})),
            );
        let common = CommonOptions {
            excluded_fields: vec!["header".into()],
            schema_validation: true,
        };
        let case = common.finish(
            OperationExample::new("x", &op).with_expected_status(404),
            &op,
            "error404",
        );
        assert_eq!(
            case.groups,
            vec!["getPet", "GET", "GET /pets", "tag:pets", "error404"]
        );
        assert_eq!(case.excluded_fields, vec!["header"]);
        assert_eq!(
            case.expected.body,
            Some(BodyMatcher::Schema(json!({"type": "object"})))
        );
        assert_eq!(case.expected.status, StatusMatcher::Exact(404));
    }
}
