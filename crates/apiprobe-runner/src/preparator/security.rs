//! 401 and 403: authentication and authorization failures

use apiprobe_core::{
    AuthType, Operation, PreparatorError, PreparatorOptions, SecurityScheme, TestCase, Token,
    TokenPool,
};

use super::{CommonOptions, NoOptions, Preparator, base_example, parse_options};
use crate::credentials;

pub(super) const UNAUTHORIZED: &str = "error401";
pub(super) const FORBIDDEN: &str = "error403";

// ── 401 ──

/// Attaches a synthesized invalid credential to every security requirement
/// of operations that declare a 401 response.
#[derive(Debug)]
pub struct Unauthorized {
    common: CommonOptions,
    invalid: Vec<Token>,
}

impl Default for Unauthorized {
    fn default() -> Self {
        Self {
            common: CommonOptions::default(),
            invalid: credentials::invalid_tokens(),
        }
    }
}

impl Preparator for Unauthorized {
    fn name(&self) -> &'static str {
        UNAUTHORIZED
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, _): (CommonOptions, NoOptions) = parse_options(UNAUTHORIZED, options)?;
        self.common = common;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        _tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        let mut cases = Vec::new();
        for op in operations.iter().filter(|op| op.has_response(401)) {
            for security in &op.securities {
                let matching = self
                    .invalid
                    .iter()
                    .filter(|t| t.auth_type == security.auth_type());
                for token in matching {
                    let example = base_example(format!("unauthorized@{}", security.name), op)
                        .with_authentication(security, &token.value)
                        .with_expected_status(401);
                    cases.push(self.common.finish(example, op, UNAUTHORIZED));
                }
            }
        }
        log::debug!("{UNAUTHORIZED}: {} cases", cases.len());
        Ok(cases)
    }
}

// ── 403 ──

/// Uses registered OAuth2 tokens lacking every required scope.
///
/// A scoped requirement with no such token is a fixture bug and fails the
/// whole preparator rather than yielding nothing.
#[derive(Debug, Default)]
pub struct Forbidden {
    common: CommonOptions,
}

impl Preparator for Forbidden {
    fn name(&self) -> &'static str {
        FORBIDDEN
    }

    fn configure(&mut self, options: &PreparatorOptions) -> Result<(), PreparatorError> {
        let (common, _): (CommonOptions, NoOptions) = parse_options(FORBIDDEN, options)?;
        self.common = common;
        Ok(())
    }

    fn prepare(
        &self,
        operations: &[Operation],
        tokens: &TokenPool,
    ) -> Result<Vec<TestCase>, PreparatorError> {
        let mut cases = Vec::new();
        for op in operations {
            let scoped = op.securities.iter().filter(|s| {
                matches!(s.scheme, SecurityScheme::OAuth2 { .. }) && !s.scopes.is_empty()
            });
            for security in scoped {
                let eligible: Vec<&Token> = tokens
                    .by_auth_type(AuthType::OAuth2)
                    .filter(|t| t.accepts(op))
                    .filter(|t| t.is_scope_disjoint(security.scope_names()))
                    .collect();
                if eligible.is_empty() {
                    return Err(PreparatorError::logic(
                        FORBIDDEN,
                        format!(
                            "no oauth2 token lacks the scopes [{}] required by '{}' on {}",
                            security.scope_names().collect::<Vec<_>>().join(", "),
                            security.name,
                            op.id
                        ),
                    ));
                }
                for token in eligible {
                    let example =
                        base_example(format!("forbidden@{}.{}", security.name, token.name), op)
                            .with_authentication(security, &token.value)
                            .with_expected_status(403);
                    cases.push(self.common.finish(example, op, FORBIDDEN));
                }
            }
        }
        log::debug!("{FORBIDDEN}: {} cases", cases.len());
        Ok(cases)
    }
}
