//! Normalized API definition: `Api → Operation → {Parameter, Request, Response, Security}`
//!
//! The model is produced by an external loader with every `$ref` resolved and
//! schema types normalized to the primitive set (see [`SchemaType`]).
//! Preparators only read it.

mod body;
mod operation;
mod parameter;
pub mod schema;
mod security;

use std::str::FromStr;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

pub use body::{Request, Response};
pub use operation::Operation;
pub use parameter::{DEFAULT_EXAMPLE, Examples, Parameter, ParameterIn, representative};
pub use schema::SchemaType;
pub use security::{ApiKeyLocation, AuthType, OAuth2Flow, Security, SecurityScheme};

/// HTTP method of an operation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Trace,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method '{s}'"))
    }
}

/// A whole API: an ordered set of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Api {
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            title: None,
            operations,
        }
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn by_method(&self, method: Method) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(move |op| op.method == method)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Operation> {
        self.operations.iter_mut().find(|op| op.id == id)
    }

    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.operations
            .iter()
            .filter(move |op| op.tags.iter().any(|t| t == tag))
    }

    /// Group operations by path template, in first-appearance order.
    #[must_use]
    pub fn by_path(&self) -> IndexMap<&str, Vec<&Operation>> {
        group_by_path(&self.operations)
    }

    /// Check every operation's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first operation whose path placeholders do not match
    /// its declared path parameters, or whose ids collide.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut seen = std::collections::HashSet::new();
        for op in &self.operations {
            if !seen.insert(op.id.as_str()) {
                return Err(DefinitionError::Invalid {
                    operation: op.id.clone(),
                    message: "duplicate operation id".into(),
                });
            }
            op.validate()?;
        }
        Ok(())
    }
}

/// Group operations by path template, in first-appearance order.
#[must_use]
pub fn group_by_path(operations: &[Operation]) -> IndexMap<&str, Vec<&Operation>> {
    let mut groups: IndexMap<&str, Vec<&Operation>> = IndexMap::new();
    for op in operations {
        groups.entry(op.path.as_str()).or_default().push(op);
    }
    groups
}
