use serde::{Deserialize, Serialize};

use super::parameter::{Parameter, ParameterIn};
use super::{Method, Request, Response, Security};
use crate::error::DefinitionError;
use crate::example::OperationExample;

/// One method + path combination of the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body variants, one per media type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<Request>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub securities: Vec<Security>,
    /// Fully assembled scenarios (loader- or fixture-provided)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<OperationExample>,
}

impl Operation {
    #[must_use]
    pub fn new(id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method,
            path: path.into(),
            summary: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            requests: Vec::new(),
            responses: Vec::new(),
            securities: Vec::new(),
            examples: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    #[must_use]
    pub fn with_security(mut self, security: Security) -> Self {
        self.securities.push(security);
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: OperationExample) -> Self {
        self.examples.push(example);
        self
    }

    /// Operation label, e.g. "POST /pets"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Group labels used for inclusion/exclusion filtering.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![self.id.clone(), self.method.to_string(), self.label()];
        labels.extend(self.tags.iter().map(|t| format!("tag:{t}")));
        labels
    }

    pub fn parameters_in(&self, location: ParameterIn) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    pub fn path_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters_in(ParameterIn::Path)
    }

    pub fn query_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters_in(ParameterIn::Query)
    }

    pub fn header_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters_in(ParameterIn::Header)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_required())
    }

    /// Find a parameter by location and name (headers match case-insensitively).
    #[must_use]
    pub fn parameter(&self, location: ParameterIn, name: &str) -> Option<&Parameter> {
        self.parameters_in(location).find(|p| {
            if location == ParameterIn::Header {
                p.name.eq_ignore_ascii_case(name)
            } else {
                p.name == name
            }
        })
    }

    pub fn responses_with_status(&self, status: u16) -> impl Iterator<Item = &Response> {
        self.responses
            .iter()
            .filter(move |r| r.status_code == status)
    }

    #[must_use]
    pub fn has_response(&self, status: u16) -> bool {
        self.responses_with_status(status).next().is_some()
    }

    /// Media types declared across all responses, first-appearance order.
    #[must_use]
    pub fn response_media_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for media in self.responses.iter().filter_map(|r| r.media_type.as_deref()) {
            if !types.contains(&media) {
                types.push(media);
            }
        }
        types
    }

    /// Whether a body exists and every declared variant is required.
    #[must_use]
    pub fn body_always_required(&self) -> bool {
        !self.requests.is_empty() && self.requests.iter().all(|r| r.required)
    }

    /// `{name}` placeholders of the path template, in order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.path.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                break;
            };
            names.push(&after[..end]);
            rest = &after[end + 1..];
        }
        names
    }

    /// Check that path placeholders and declared path parameters agree.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::Invalid` naming the first mismatch.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let placeholders = self.placeholders();
        for name in &placeholders {
            if self.parameter(ParameterIn::Path, name).is_none() {
                return Err(DefinitionError::Invalid {
                    operation: self.id.clone(),
                    message: format!("placeholder {{{name}}} has no path parameter"),
                });
            }
        }
        for param in self.path_parameters() {
            if !placeholders.contains(&param.name.as_str()) {
                return Err(DefinitionError::Invalid {
                    operation: self.id.clone(),
                    message: format!("path parameter '{}' is not in the path", param.name),
                });
            }
        }
        Ok(())
    }
}
