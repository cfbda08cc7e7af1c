//! Group-label inclusion/exclusion filter
//!
//! Used for the suite's operation set, for emitted test cases and for
//! per-token eligibility. Labels are plain strings: operation id, method,
//! "METHOD /path", `tag:<name>` and, on test cases, the preparator name.

use serde::{Deserialize, Serialize};

use crate::definition::Operation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
    /// When non-empty, at least one label must match
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Any matching label rejects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl GroupFilter {
    #[must_use]
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    #[must_use]
    pub fn accepts<S: AsRef<str>>(&self, groups: &[S]) -> bool {
        let hit = |list: &[String]| {
            groups
                .iter()
                .any(|g| list.iter().any(|l| l.as_str() == g.as_ref()))
        };
        if !self.include.is_empty() && !hit(&self.include) {
            return false;
        }
        !hit(&self.exclude)
    }

    #[must_use]
    pub fn accepts_operation(&self, operation: &Operation) -> bool {
        self.is_empty() || self.accepts(&operation.labels())
    }

    /// Whether an exclude entry names one of the operation's labels.
    ///
    /// Include entries may name preparators, so they are only applied to
    /// emitted test cases.
    #[must_use]
    pub fn excludes_operation(&self, operation: &Operation) -> bool {
        let labels = operation.labels();
        self.exclude.iter().any(|e| labels.contains(e))
    }
}
