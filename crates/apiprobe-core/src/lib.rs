//! apiprobe-core: Definition model and test case types for API test preparation
//!
//! This crate provides the normalized API definition (operations, parameters,
//! bodies, responses, security requirements), the `OperationExample` builder
//! used to assemble concrete requests, and the `TestCase` values that
//! preparators emit.

pub mod config;
pub mod definition;
pub mod error;
pub mod example;
pub mod filter;
pub mod generator;
pub mod testcase;
pub mod token;

pub use config::{Config, ConfigError, PreparatorOptions};
pub use definition::{
    Api, ApiKeyLocation, AuthType, Examples, Method, OAuth2Flow, Operation, Parameter,
    ParameterIn, Request, Response, SchemaType, Security, SecurityScheme,
};
pub use error::{DefinitionError, ErrorKind, PreparatorError};
pub use example::OperationExample;
pub use filter::GroupFilter;
pub use generator::to_http_file;
pub use testcase::{
    BodyMatcher, ExpectedResponse, RequestBody, StatusMatcher, TestCase, TestRequest,
    generate_schema,
};
pub use token::{Token, TokenPool};
