//! 405: methods a path does not declare

use serde::Deserialize;

use apiprobe_core::definition::group_by_path;
use apiprobe_core::{Method, Operation, PreparatorError, PreparatorOptions, TestCase, TokenPool};

use super::{CommonOptions, Preparator, base_example, parse_options};

pub(super) const NAME: &str = "error405";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MethodNotAllowedOptions {
    /// Candidate methods, tried in this order
    #[serde(default = "default_methods")]
    methods: Vec<Method>,
}

impl Default for MethodNotAllowedOptions {
    fn default() -> Self {
        Self {
            methods: default_methods(),
        }
    }
}

fn default_methods() -> Vec<Method> {
    vec![Method::Patch, Method::Put, Method::Get, Method::Delete]
}

#[derive(Debug, Default)]
pub struct MethodNotAllowed {
    common: CommonOptions,
    options: MethodNotAllowedOptions,
}

impl Preparator for MethodNotAllowed {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, mut specific): (CommonOptions, MethodNotAllowedOptions) =
            parse_options(NAME, options)?;
        let mut seen = Vec::new();
        specific.methods.retain(|m| {
            let first = !seen.contains(m);
            seen.push(*m);
            first
        });
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
        for (path, ops) in group_by_path(operations) {
            let Some(first) = ops.first() else {
                continue;
            };
            let undeclared = self
                .options
                .methods
                .iter()
                .filter(|m| !ops.iter().any(|op| op.method == **m));
            for method in undeclared {
                log::debug!("{NAME}: {method} {path} is undeclared");
                let example = base_example(format!("method_not_allowed@{method}"), first)
                    .with_method(*method)
                    .without_body()
                    .with_expected_status(405);
                let mut case = self.common.finish(example, first, NAME);
                relabel(&mut case.groups, first, *method);
                cases.push(case);
            }
        }
        log::debug!("{NAME}: {} cases", cases.len());
        Ok(cases)
    }
}

/// Swap the declared method's labels for the one the case sends.
fn relabel(groups: &mut [String], declared: &Operation, sent: Method) {
    let (method, label) = (declared.method.to_string(), declared.label());
    for group in groups {
        if *group == method {
            *group = sent.to_string();
        } else if *group == label {
            *group = format!("{sent} {}", declared.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preparator::{case_names, options_from};
    use apiprobe_core::{ErrorKind, Parameter, ParameterIn};
    use serde_json::json;

    fn pets() -> Vec<Operation> {
        vec![
            Operation::new("patchPet", Method::Patch, "/pets/{id}")
                .with_parameter(Parameter::new("id", ParameterIn::Path)),
            Operation::new("listPets", Method::Get, "/pets"),
            Operation::new("createPet", Method::Post, "/pets/{id}")
                .with_parameter(Parameter::new("id", ParameterIn::Path)),
        ]
    }

    #[test]
    fn undeclared_candidates_per_path() {
        let cases = MethodNotAllowed::default()
            .prepare(&pets(), &TokenPool::default())
            .unwrap();
        insta::assert_snapshot!(case_names(&cases), @r"
        patchPet/method_not_allowed@PUT
        patchPet/method_not_allowed@GET
        patchPet/method_not_allowed@DELETE
        listPets/method_not_allowed@PATCH
        listPets/method_not_allowed@PUT
        listPets/method_not_allowed@DELETE
        ");
        assert_eq!(cases[0].request.method, Method::Put);
        assert_eq!(cases[0].request.path, "/pets/string");
        assert!(cases.iter().all(|c| c.expected_status() == Some(405)));
    }

    #[test]
    fn groups_name_the_sent_method() {
        let cases = MethodNotAllowed::default()
            .prepare(&pets(), &TokenPool::default())
            .unwrap();
        assert_eq!(
            cases[0].groups,
            vec!["patchPet", "PUT", "PUT /pets/{id}", "error405"]
        );
        assert_eq!(
            cases[3].groups,
            vec!["listPets", "PATCH", "PATCH /pets", "error405"]
        );
    }

    #[test]
    fn configured_methods_replace_defaults() {
        let mut preparator = MethodNotAllowed::default();
        preparator
            .configure(&options_from(json!({"methods": ["OPTIONS", "GET", "GET"]})))
            .unwrap();
        let cases = preparator.prepare(&pets(), &TokenPool::default()).unwrap();
        insta::assert_snapshot!(case_names(&cases), @r"
        patchPet/method_not_allowed@OPTIONS
        patchPet/method_not_allowed@GET
        listPets/method_not_allowed@OPTIONS
        ");
    }

    #[test]
    fn unknown_method_is_invalid_config() {
        let err = MethodNotAllowed::default()
            .configure(&options_from(json!({"methods": ["FETCH"]})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
