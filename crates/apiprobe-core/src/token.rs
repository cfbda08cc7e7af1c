//! Credential fixtures used by the security preparators

use serde::{Deserialize, Serialize};

use crate::definition::{AuthType, Operation};
use crate::filter::GroupFilter;

/// A named credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub auth_type: AuthType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Restricts which operations the token may be used against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<GroupFilter>,
}

impl Token {
    #[must_use]
    pub fn new(name: impl Into<String>, auth_type: AuthType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auth_type,
            value: value.into(),
            scopes: Vec::new(),
            filters: None,
        }
    }

    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: GroupFilter) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Whether the token's filters allow it for this operation.
    #[must_use]
    pub fn accepts(&self, operation: &Operation) -> bool {
        self.filters
            .as_ref()
            .is_none_or(|f| f.accepts_operation(operation))
    }

    /// Whether the token shares no scope with `required`.
    #[must_use]
    pub fn is_scope_disjoint<'a>(&self, mut required: impl Iterator<Item = &'a str>) -> bool {
        required.all(|scope| !self.scopes.iter().any(|s| s == scope))
    }
}

/// The registered token set, immutable once handed to preparators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPool {
    tokens: Vec<Token>,
}

impl TokenPool {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn by_auth_type(&self, auth_type: AuthType) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.auth_type == auth_type)
    }
}

impl From<Vec<Token>> for TokenPool {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Method;

    #[test]
    fn scope_disjointness() {
        let t = Token::new("t", AuthType::OAuth2, "v").with_scopes(["scope3", "scope4"]);
        assert!(t.is_scope_disjoint(["scope1", "scope2"].into_iter()));
        assert!(!t.is_scope_disjoint(["scope1", "scope4"].into_iter()));
        assert!(t.is_scope_disjoint(std::iter::empty()));
    }

    #[test]
    fn filters_restrict_operations() {
        let op = Operation::new("deletePet", Method::Delete, "/pets/{id}");
        let t = Token::new("t", AuthType::OAuth2, "v");
        assert!(t.accepts(&op));
        let t = t.with_filters(GroupFilter::new(vec![], vec!["deletePet".into()]));
        assert!(!t.accepts(&op));
    }

    #[test]
    fn pool_by_auth_type_keeps_order() {
        let pool = TokenPool::from(vec![
            Token::new("a", AuthType::OAuth2, "1"),
            Token::new("b", AuthType::HttpBasic, "2"),
            Token::new("c", AuthType::OAuth2, "3"),
        ]);
        let names: Vec<_> = pool
            .by_auth_type(AuthType::OAuth2)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn token_deserializes_from_toml() {
        let t: Token = toml::from_str(
            r#"
name = "reader"
auth_type = "oauth2"
value = "abc"
scopes = ["pets:read"]

[filters]
exclude = ["deletePet"]
"#,
        )
        .unwrap();
        assert_eq!(t.auth_type, AuthType::OAuth2);
        assert_eq!(t.scopes, vec!["pets:read"]);
        assert_eq!(t.filters.unwrap().exclude, vec!["deletePet"]);
    }
}
