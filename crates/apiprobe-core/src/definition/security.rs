use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Credential family, shared by security schemes and tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    HttpBasic,
    HttpBearer,
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
}

impl AuthType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HttpBasic => "http_basic",
            Self::HttpBearer => "http_bearer",
            Self::ApiKey => "api_key",
            Self::OAuth2 => "oauth2",
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an API key is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Cookie,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuth2Flow {
    Implicit,
    Password,
    ClientCredentials,
    AuthorizationCode,
}

/// Scheme-specific part of a security requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityScheme {
    HttpBasic,
    HttpBearer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    ApiKey {
        key_name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
    },
    #[serde(rename = "oauth2")]
    OAuth2 { flow: OAuth2Flow },
}

/// A security requirement attached to an operation.
///
/// `scopes` maps scope name → description and lists what the operation
/// requires (OAuth2 only in practice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,
    #[serde(flatten)]
    pub scheme: SecurityScheme,
}

impl Security {
    #[must_use]
    pub fn new(name: impl Into<String>, scheme: SecurityScheme) -> Self {
        Self {
            name: name.into(),
            scopes: IndexMap::new(),
            scheme,
        }
    }

    #[must_use]
    pub fn http_basic(name: impl Into<String>) -> Self {
        Self::new(name, SecurityScheme::HttpBasic)
    }

    #[must_use]
    pub fn http_bearer(name: impl Into<String>) -> Self {
        Self::new(
            name,
            SecurityScheme::HttpBearer {
                bearer_format: None,
            },
        )
    }

    #[must_use]
    pub fn api_key(
        name: impl Into<String>,
        key_name: impl Into<String>,
        location: ApiKeyLocation,
    ) -> Self {
        Self::new(
            name,
            SecurityScheme::ApiKey {
                key_name: key_name.into(),
                location,
            },
        )
    }

    #[must_use]
    pub fn oauth2(name: impl Into<String>, flow: OAuth2Flow) -> Self {
        Self::new(name, SecurityScheme::OAuth2 { flow })
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(scope.into(), description.into());
        self
    }

    #[must_use]
    pub const fn auth_type(&self) -> AuthType {
        match self.scheme {
            SecurityScheme::HttpBasic => AuthType::HttpBasic,
            SecurityScheme::HttpBearer { .. } => AuthType::HttpBearer,
            SecurityScheme::ApiKey { .. } => AuthType::ApiKey,
            SecurityScheme::OAuth2 { .. } => AuthType::OAuth2,
        }
    }

    /// Required scope names, declaration order.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }
}
