//! Comparing an actual response with a test case's expectation
//!
//! No I/O. The requester hands over status, headers and raw body text;
//! every mismatch is reported, not just the first.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use apiprobe_core::{BodyMatcher, StatusMatcher, TestCase};

use crate::preparator::fields::remove_path;

/// What came back for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value, name matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One expectation the response did not meet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// `status`, `header.<name>` or `body`
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Check a response against `case`. An empty result means it passed.
#[must_use]
pub fn check(case: &TestCase, response: &HttpResponse) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    // ── Status ──
    check_status(&case.expected.status, response.status, &mut mismatches);

    // ── Headers ──
    if !case.excludes("header") {
        for (name, expected) in &case.expected.headers {
            match response.header(name) {
                Some(actual) if actual == expected.as_str() => {}
                actual => mismatches.push(Mismatch::new(
                    format!("header.{name}"),
                    expected.as_str(),
                    actual.unwrap_or("<absent>"),
                )),
            }
        }
    }

    // ── Body ──
    if !case.excludes("body") {
        if let Some(matcher) = &case.expected.body {
            check_body(case, matcher, &response.body, &mut mismatches);
        }
    }

    mismatches
}

fn check_status(matcher: &StatusMatcher, status: u16, mismatches: &mut Vec<Mismatch>) {
    let ok = match matcher {
        StatusMatcher::Exact(code) => *code == status,
        StatusMatcher::Pattern(pattern) => match Regex::new(pattern) {
            Ok(re) => re.is_match(&status.to_string()),
            Err(e) => {
                let actual = format!("invalid pattern: {e}");
                mismatches.push(Mismatch::new("status", matcher.to_string(), actual));
                return;
            }
        },
    };
    if !ok {
        mismatches.push(Mismatch::new(
            "status",
            matcher.to_string(),
            status.to_string(),
        ));
    }
}

fn check_body(
    case: &TestCase,
    matcher: &BodyMatcher,
    body: &str,
    mismatches: &mut Vec<Mismatch>,
) {
    match matcher {
        BodyMatcher::Text(expected) => {
            if expected.trim() != body.trim() {
                mismatches.push(Mismatch::new("body", expected.as_str(), truncate(body)));
            }
        }
        BodyMatcher::Json(expected) => {
            let Ok(mut actual) = serde_json::from_str::<Value>(body) else {
                let actual = format!("non-JSON: {}", truncate(body));
                mismatches.push(Mismatch::new("body", expected.to_string(), actual));
                return;
            };
            let mut expected = expected.clone();
            let excluded_paths = case
                .excluded_fields
                .iter()
                .filter_map(|f| f.strip_prefix("body."));
            for excluded in excluded_paths {
                let path: Vec<&str> = excluded.split('.').collect();
                remove_path(&mut expected, &path);
                remove_path(&mut actual, &path);
            }
            if expected != actual {
                mismatches.push(Mismatch::new(
                    "body",
                    expected.to_string(),
                    actual.to_string(),
                ));
            }
        }
        BodyMatcher::Schema(schema) => {
            let Ok(actual) = serde_json::from_str::<Value>(body) else {
                let actual = format!("non-JSON: {}", truncate(body));
                mismatches.push(Mismatch::new("body", SCHEMA_MATCH, actual));
                return;
            };
            match jsonschema::validator_for(schema) {
                Ok(validator) => {
                    let errors: Vec<String> = validator
                        .iter_errors(&actual)
                        .take(5)
                        .map(|e| e.to_string())
                        .collect();
                    if !errors.is_empty() {
                        mismatches.push(Mismatch::new("body", SCHEMA_MATCH, errors.join("; ")));
                    }
                }
                Err(e) => {
                    log::warn!("{}: unusable response schema: {e}", case.name);
                    let actual = format!("invalid schema: {e}");
                    mismatches.push(Mismatch::new("body", SCHEMA_MATCH, actual));
                }
            }
        }
    }
}

const SCHEMA_MATCH: &str = "JSON matching schema";

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
