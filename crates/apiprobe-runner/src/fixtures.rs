//! Extension fixtures: named, fully specified request/response pairs
//!
//! A fixture file maps fixture names to scenarios attached to an operation
//! by `operationId`:
//!
//! ```yaml
//! adopt_rex:
//!   operationId: createPet
//!   request:
//!     body: {name: Rex}
//!   response:
//!     statusCode: 201
//!     body: {id: 1, name: Rex}
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use apiprobe_core::example::encode_value;
use apiprobe_core::{
    BodyMatcher, ExpectedResponse, Operation, OperationExample, ParameterIn, RequestBody,
};

/// Fixtures by name, in file order.
pub type Fixtures = IndexMap<String, Fixture>;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Invalid fixtures in {0}: {1}")]
    Parse(PathBuf, String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixture {
    pub operation_id: String,
    #[serde(default)]
    pub request: FixtureRequest,
    pub response: FixtureResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureRequest {
    #[serde(default)]
    pub path: IndexMap<String, Value>,
    #[serde(default)]
    pub query: IndexMap<String, Value>,
    #[serde(default)]
    pub header: IndexMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FixtureResponse {
    pub status_code: u16,
    #[serde(default)]
    pub header: IndexMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl Fixture {
    /// Example named `name` for `operation`; required values the fixture
    /// leaves out are filled from the definition.
    #[must_use]
    pub fn to_example(&self, name: &str, operation: &Operation) -> OperationExample {
        let request = &self.request;
        let mut example = OperationExample::new(name, operation);
        let located = [
            (ParameterIn::Path, &request.path),
            (ParameterIn::Query, &request.query),
            (ParameterIn::Header, &request.header),
        ];
        for (location, values) in located {
            for (key, value) in values {
                example = example.with_raw_parameter(location, key, encode_value(value));
            }
        }
        if let Some(body) = &request.body {
            let media_type = operation
                .requests
                .first()
                .map_or("application/json", |r| r.media_type.as_str());
            example = example.with_body(RequestBody::new(media_type, body.clone()));
        }

        let mut expected = ExpectedResponse::status(self.response.status_code);
        for (key, value) in &self.response.header {
            expected = expected.with_header(key.clone(), encode_value(value));
        }
        if let Some(body) = &self.response.body {
            expected = expected.with_body(BodyMatcher::Json(body.clone()));
        }

        example.with_response(expected).auto_complete(operation)
    }
}

/// Read fixtures from a YAML or JSON file (by extension; YAML otherwise).
///
/// # Errors
///
/// Returns `FixtureError` if the file cannot be read or does not match the
/// fixture shape.
pub fn load_fixtures(path: &Path) -> Result<Fixtures, FixtureError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FixtureError::Io(path.to_path_buf(), e.to_string()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yml::from_str(&content).map_err(|e| e.to_string())
    };
    let fixtures: Fixtures = parsed.map_err(|e| FixtureError::Parse(path.to_path_buf(), e))?;
    log::debug!("loaded {} fixtures from {}", fixtures.len(), path.display());
    Ok(fixtures)
}
