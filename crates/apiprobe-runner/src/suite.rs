//! Suite: wires definition, configuration, tokens and preparators together
//!
//! Preparators run in registry order. A recoverable failure (fixture
//! loading) skips that preparator with a warning; anything else aborts.

use apiprobe_core::{
    Api, Config, DefinitionError, GroupFilter, Operation, PreparatorError, TestCase, TestRequest,
    TokenPool,
};

use crate::assert::{HttpResponse, Mismatch, check};
use crate::definition::load_api;
use crate::preparator::{self, Preparator};

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Preparator(#[from] PreparatorError),
}

/// Sends one prepared request and returns what came back.
pub trait Requester {
    type Error: std::fmt::Display;

    /// # Errors
    ///
    /// Transport failures; they are recorded per case, not fatal.
    fn send(&mut self, request: &TestRequest) -> Result<HttpResponse, Self::Error>;
}

/// Result of executing one case
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed(Vec<Mismatch>),
    /// The request could not be sent
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub case: TestCase,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteReport {
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Passed)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| r.outcome != Outcome::Passed)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

pub struct Suite {
    operations: Vec<Operation>,
    preparators: Vec<Box<dyn Preparator>>,
    tokens: TokenPool,
    filters: GroupFilter,
    skipped: Vec<PreparatorError>,
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("operations", &self.operations.len())
            .field("preparators", &self.preparator_names())
            .field("tokens", &self.tokens.len())
            .field("filters", &self.filters)
            .finish()
    }
}

impl Suite {
    /// Load the configured definition and build the suite.
    ///
    /// # Errors
    ///
    /// Definition loading failures and fatal preparator configuration errors.
    pub fn new(config: &Config) -> Result<Self, SuiteError> {
        let api = load_api(&config.definition)?;
        Self::from_api(api, config)
    }

    /// Build the suite over an already loaded definition.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for options naming an unknown preparator or
    /// rejected by one; `Loading` errors only skip the preparator.
    pub fn from_api(api: Api, config: &Config) -> Result<Self, SuiteError> {
        for name in config.preparators.keys() {
            preparator::by_name(name)?;
        }

        let operations: Vec<Operation> = api
            .operations
            .into_iter()
            .filter(|op| {
                let excluded = config.filters.excludes_operation(op);
                if excluded {
                    log::debug!("operation {} excluded by filters", op.id);
                }
                !excluded
            })
            .collect();

        let mut preparators = Vec::new();
        let mut skipped = Vec::new();
        for mut preparator in preparator::all() {
            match preparator.configure(&config.options_for(preparator.name())) {
                Ok(()) => preparators.push(preparator),
                Err(e) if e.is_recoverable() => {
                    log::warn!("skipping {}: {e}", preparator.name());
                    skipped.push(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            operations,
            preparators,
            tokens: config.token_pool(),
            filters: config.filters.clone(),
            skipped,
        })
    }

    /// Keep only the named preparators.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when a name matches no preparator.
    pub fn only(mut self, names: &[String]) -> Result<Self, SuiteError> {
        if names.is_empty() {
            return Ok(self);
        }
        for name in names {
            preparator::by_name(name)?;
        }
        self.preparators
            .retain(|p| names.iter().any(|n| n == p.name()));
        Ok(self)
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn preparator_names(&self) -> Vec<&'static str> {
        self.preparators.iter().map(|p| p.name()).collect()
    }

    /// Preparators dropped at configure time with a recoverable error.
    #[must_use]
    pub fn skipped(&self) -> &[PreparatorError] {
        &self.skipped
    }

    /// Generate every case, in registry order, filtered by group.
    ///
    /// # Errors
    ///
    /// The first fatal preparator error.
    pub fn prepare(&self) -> Result<Vec<TestCase>, SuiteError> {
        let mut cases = Vec::new();
        for preparator in &self.preparators {
            match preparator.prepare(&self.operations, &self.tokens) {
                Ok(generated) => {
                    let before = cases.len();
                    cases.extend(
                        generated
                            .into_iter()
                            .filter(|c| self.filters.accepts(&c.groups)),
                    );
                    log::debug!("{}: {} cases kept", preparator.name(), cases.len() - before);
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("skipping {}: {e}", preparator.name());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(cases)
    }

    /// Prepare, send every case through `requester` and check the responses.
    ///
    /// # Errors
    ///
    /// Fatal preparator errors; transport errors are recorded per case.
    pub fn run<R: Requester>(&self, requester: &mut R) -> Result<SuiteReport, SuiteError> {
        let mut report = SuiteReport::default();
        for case in self.prepare()? {
            let outcome = match requester.send(&case.request) {
                Ok(response) => {
                    let mismatches = check(&case, &response);
                    if mismatches.is_empty() {
                        Outcome::Passed
                    } else {
                        Outcome::Failed(mismatches)
                    }
                }
                Err(e) => {
                    log::warn!("{}: request failed: {e}", case.name);
                    Outcome::Error(e.to_string())
                }
            };
            report.results.push(CaseResult { case, outcome });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_core::{ErrorKind, Method, Parameter, ParameterIn, Response};
    use serde_json::json;

    fn api() -> Api {
        Api::new(vec![
            Operation::new("getPet", Method::Get, "/pets/{id}")
                .with_tag("pets")
                .with_parameter(
                    Parameter::new("id", ParameterIn::Path).with_schema(json!({"type": "integer"})),
                )
                .with_response(Response::new(200))
                .with_response(Response::new(404).with_description("Pet not found")),
            Operation::new("deletePet", Method::Delete, "/pets/{id}")
                .with_parameter(Parameter::new("id", ParameterIn::Path))
                .with_response(Response::new(404)),
        ])
    }

    fn filtered(include: &[&str], exclude: &[&str]) -> Config {
        let labels = |l: &[&str]| l.iter().map(ToString::to_string).collect();
        Config {
            filters: GroupFilter::new(labels(include), labels(exclude)),
            ..Config::default()
        }
    }

    fn with_options(name: &str, options: serde_json::Value) -> Config {
        let mut config = Config::default();
        if let serde_json::Value::Object(map) = options {
            config.preparators.insert(name.to_string(), map);
        }
        config
    }

    #[test]
    fn excluded_operations_never_reach_preparators() {
        let suite = Suite::from_api(api(), &filtered(&[], &["deletePet"])).unwrap();
        assert_eq!(suite.operations().len(), 1);
        let cases = suite.only(&["error404".into()]).unwrap().prepare().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "getPet/not_found");
    }

    #[test]
    fn include_filter_applies_to_case_groups() {
        let suite = Suite::from_api(api(), &filtered(&["error405"], &[])).unwrap();
        let cases = suite.prepare().unwrap();
        assert!(!cases.is_empty());
        assert!(cases.iter().all(|c| c.preparator == "error405"));
    }

    #[test]
    fn unknown_preparator_in_config_is_invalid() {
        let err = Suite::from_api(api(), &with_options("error999", json!({}))).unwrap_err();
        let SuiteError::Preparator(e) = err else {
            panic!("expected preparator error");
        };
        assert_eq!(e.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn loading_errors_skip_the_preparator() {
        let config = with_options(
            "examples",
            json!({"fixturesPath": "/nonexistent/fixtures.yaml"}),
        );
        let suite = Suite::from_api(api(), &config).unwrap();
        assert!(!suite.preparator_names().contains(&"examples"));
        assert_eq!(suite.skipped().len(), 1);
        assert_eq!(suite.skipped()[0].preparator(), "examples");
    }

    #[test]
    fn only_rejects_unknown_names() {
        let suite = Suite::from_api(api(), &Config::default()).unwrap();
        assert!(suite.only(&["nope".into()]).is_err());
    }

    struct Canned(u16);

    impl Requester for Canned {
        type Error = String;

        fn send(&mut self, request: &TestRequest) -> Result<HttpResponse, String> {
            if request.path.contains("2147483647") {
                Ok(HttpResponse::new(self.0).with_body("Pet not found"))
            } else {
                Err("connection refused".into())
            }
        }
    }

    #[test]
    fn run_checks_every_case() {
        let suite = Suite::from_api(api(), &Config::default())
            .unwrap()
            .only(&["error404".into()])
            .unwrap();
        let report = suite.run(&mut Canned(404)).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.passed(), 2);
        assert!(report.is_success());

        let report = suite.run(&mut Canned(200)).unwrap();
        assert_eq!(report.passed(), 0);
        assert!(matches!(report.results[0].outcome, Outcome::Failed(_)));
    }

    #[test]
    fn transport_errors_are_recorded() {
        let suite = Suite::from_api(api(), &Config::default())
            .unwrap()
            .only(&["error405".into()])
            .unwrap();
        let report = suite.run(&mut Canned(404)).unwrap();
        assert!(!report.results.is_empty());
        assert!(report
            .failures()
            .all(|r| r.outcome == Outcome::Error("connection refused".into())));
    }
}
