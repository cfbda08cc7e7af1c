//! Suite configuration for test case preparation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::filter::GroupFilter;
use crate::token::{Token, TokenPool};

/// Options for one preparator, as written in the config file
pub type PreparatorOptions = Map<String, Value>;

/// Suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Normalized API definition (JSON or YAML)
    pub definition: PathBuf,

    /// Operation and test case group filter
    #[serde(default)]
    pub filters: GroupFilter,

    /// Credentials available to the security preparators
    #[serde(default)]
    pub tokens: Vec<Token>,

    /// Per-preparator options, keyed by preparator name.
    /// Preparators not listed here run with their defaults.
    #[serde(default)]
    pub preparators: IndexMap<String, PreparatorOptions>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definition: PathBuf::from("api.json"),
            filters: GroupFilter::default(),
            tokens: Vec::new(),
            preparators: IndexMap::new(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let mut config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        // definition path is relative to the config file
        if config.definition.is_relative() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                config.definition = dir.join(&config.definition);
            }
        }
        Ok(config)
    }

    /// Load from default location (.apiprobe.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be loaded
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".apiprobe.toml", ".apiprobe.json", "apiprobe.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    #[must_use]
    pub fn token_pool(&self) -> TokenPool {
        TokenPool::new(self.tokens.clone())
    }

    /// Options for `name`, empty when the config does not mention it.
    #[must_use]
    pub fn options_for(&self, name: &str) -> PreparatorOptions {
        self.preparators.get(name).cloned().unwrap_or_default()
    }

    /// Example config file
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apiprobe configuration

# Normalized API definition (JSON or YAML)
definition = "api.json"

# Operation / test case filter over group labels:
# operation id, METHOD, "METHOD /path", tag:<name>, preparator name
[filters]
# include = ["tag:pets"]
exclude = []

# Credentials for the 401/403 preparators
# [[tokens]]
# name = "reader"
# auth_type = "oauth2"
# value = "eyJhbGciOi..."
# scopes = ["pets:read"]
# [tokens.filters]
# exclude = ["deletePet"]

# Per-preparator options (all optional)
# [preparators.error405]
# methods = ["PATCH", "PUT", "GET", "DELETE"]
#
# [preparators.error406]
# count = 3
# seed = 0
#
# [preparators.random]
# casesCount = 10
# seed = 0
# statusCode = "^[1-4][0-9]{2}$"
#
# [preparators.examples]
# fixturesPath = "fixtures.yaml"
# excludedFields = ["header"]
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
