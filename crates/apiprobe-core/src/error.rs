//! Error kinds shared by preparators and definition loading

use std::path::PathBuf;

/// How a caller should react to a [`PreparatorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or unknown options; surfaced at configure time
    InvalidConfig,
    /// Broken fixture set; abort this preparator
    Logic,
    /// Fixture/extension could not be loaded; log and skip this preparator
    Loading,
}

#[derive(Debug, thiserror::Error)]
pub enum PreparatorError {
    #[error("Invalid config for {preparator}: {message}")]
    InvalidConfig { preparator: String, message: String },
    #[error("{preparator}: {message}")]
    Logic { preparator: String, message: String },
    #[error("Cannot load fixtures for {preparator}: {message}")]
    Loading { preparator: String, message: String },
}

impl PreparatorError {
    pub fn invalid_config(preparator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            preparator: preparator.into(),
            message: message.into(),
        }
    }

    pub fn logic(preparator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Logic {
            preparator: preparator.into(),
            message: message.into(),
        }
    }

    pub fn loading(preparator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Loading {
            preparator: preparator.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::Logic { .. } => ErrorKind::Logic,
            Self::Loading { .. } => ErrorKind::Loading,
        }
    }

    /// Only loading failures let the suite carry on without this preparator.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Loading)
    }

    #[must_use]
    pub fn preparator(&self) -> &str {
        match self {
            Self::InvalidConfig { preparator, .. }
            | Self::Logic { preparator, .. }
            | Self::Loading { preparator, .. } => preparator,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid operation '{operation}': {message}")]
    Invalid { operation: String, message: String },
}
