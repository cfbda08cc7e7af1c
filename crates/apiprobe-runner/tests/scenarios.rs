//! End-to-end preparation scenarios through the public API

use std::io::Write;

use apiprobe_core::{
    AuthType, BodyMatcher, Config, ErrorKind, Method, OAuth2Flow, Operation, Parameter,
    ParameterIn, Request, Response, Security, TestCase, Token, TokenPool,
};
use apiprobe_runner::preparator;
use apiprobe_runner::{HttpResponse, Requester, Suite, SuiteError};
use serde_json::json;

fn prepare(name: &str, ops: &[Operation], tokens: &TokenPool) -> Vec<TestCase> {
    preparator::by_name(name)
        .unwrap()
        .prepare(ops, tokens)
        .unwrap()
}

fn names(cases: &[TestCase]) -> Vec<&str> {
    cases.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn bad_types_on_required_integer_query() {
    let op = Operation::new("getTest", Method::Get, "/test").with_parameter(
        Parameter::new("foo_query", ParameterIn::Query)
            .with_required(true)
            .with_schema(json!({"type": "integer"})),
    );
    let cases = prepare("error400_bad_types", &[op], &TokenPool::default());
    assert_eq!(cases.len(), 4);
    let paths: Vec<&str> = cases.iter().map(|c| c.request.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/test?foo_query=foo",
            "/test?foo_query=1.234",
            "/test?foo_query=true",
            "/test?foo_query=foo,bar",
        ]
    );
    assert!(cases.iter().all(|c| c.expected_status() == Some(400)));
}

#[test]
fn bad_formats_on_email_body_field() {
    let op = Operation::new("postTest", Method::Post, "/test").with_request(
        Request::new(
            "application/json",
            json!({
                "properties": {"foo": {"format": "email", "type": "string"}},
                "required": ["foo"],
                "type": "object"
            }),
        )
        .with_required(true)
        .with_example("default", json!({"foo": "foo@bar.com"})),
    );
    let cases = prepare("error400_bad_formats", &[op], &TokenPool::default());
    assert_eq!(names(&cases), vec!["postTest/bad_format@body.foo"]);
    assert_eq!(cases[0].request.body.as_ref().unwrap().content, json!({"foo": "foo"}));
    assert_eq!(cases[0].expected_status(), Some(400));
}

#[test]
fn not_found_on_integer_path_parameter() {
    let op = Operation::new("getTest", Method::Get, "/test/{id}")
        .with_parameter(Parameter::new("id", ParameterIn::Path).with_schema(json!({"type": "integer"})))
        .with_response(Response::new(404).with_description("Test not found"));
    let cases = prepare("error404", &[op], &TokenPool::default());
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].request.path, "/test/2147483647");
    assert_eq!(cases[0].expected_status(), Some(404));
    assert_eq!(cases[0].expected.body, Some(BodyMatcher::Text("Test not found".into())));
}

#[test]
fn forbidden_with_scope_disjoint_tokens() {
    let op = Operation::new("readPets", Method::Get, "/pets").with_security(
        Security::oauth2("petstore_auth", OAuth2Flow::AuthorizationCode)
            .with_scope("scope1", "")
            .with_scope("scope2", ""),
    );
    let tokens = TokenPool::from(vec![
        Token::new("T1", AuthType::OAuth2, "t1").with_scopes(["scope1", "scope2"]),
        Token::new("T2", AuthType::OAuth2, "t2").with_scopes(["scope3", "scope4"]),
        Token::new("T3", AuthType::OAuth2, "t3").with_scopes(["scope5"]),
    ]);
    let cases = prepare("error403", std::slice::from_ref(&op), &tokens);
    assert_eq!(
        names(&cases),
        vec!["readPets/forbidden@petstore_auth.T2", "readPets/forbidden@petstore_auth.T3"]
    );
    assert!(cases.iter().all(|c| c.request.headers["Authorization"] != "Bearer t1"));
    assert_eq!(cases, prepare("error403", &[op], &tokens));
}

#[test]
fn forbidden_without_disjoint_token_aborts() {
    let op = Operation::new("readPets", Method::Get, "/pets").with_security(
        Security::oauth2("petstore_auth", OAuth2Flow::Implicit).with_scope("scope1", ""),
    );
    let tokens = TokenPool::from(vec![
        Token::new("T1", AuthType::OAuth2, "t1").with_scopes(["scope1"]),
    ]);
    let err = preparator::by_name("error403")
        .unwrap()
        .prepare(&[op], &tokens)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Logic);
}

#[test]
fn too_large_query_range() {
    let op = Operation::new("listPets", Method::Get, "/pets")
        .with_parameter(Parameter::new("offset", ParameterIn::Query))
        .with_parameter(Parameter::new("limit", ParameterIn::Query));
    let mut preparator = preparator::by_name("error413").unwrap();
    let options = json!({"range": [{"in": "query", "lowerName": "offset", "upperName": "limit"}]});
    let serde_json::Value::Object(options) = options else {
        unreachable!();
    };
    preparator.configure(&options).unwrap();
    let cases = preparator.prepare(&[op], &TokenPool::default()).unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].request.path, "/pets?offset=0&limit=1000000000");
    assert_eq!(cases[0].expected_status(), Some(413));
}

#[test]
fn method_not_allowed_for_patch_post_path() {
    let ops = [
        Operation::new("patchPet", Method::Patch, "/pets"),
        Operation::new("createPet", Method::Post, "/pets"),
    ];
    let cases = prepare("error405", &ops, &TokenPool::default());
    let methods: Vec<Method> = cases.iter().map(|c| c.request.method).collect();
    assert_eq!(methods, vec![Method::Put, Method::Get, Method::Delete]);
}

const DEFINITION: &str = "
title: Pets
operations:
  - id: getPet
    method: GET
    path: /pets/{id}
    tags: [pets]
    parameters:
      - name: id
        in: path
        schema: {type: integer}
        examples: {default: 1}
    responses:
      - status_code: 200
        media_type: application/json
        schema: {type: object}
        examples: {default: {id: 1}}
      - status_code: 404
        description: Pet not found
";

struct Petstore;

impl Requester for Petstore {
    type Error = std::convert::Infallible;

    fn send(&mut self, request: &apiprobe_core::TestRequest) -> Result<HttpResponse, Self::Error> {
        Ok(match request.path.as_str() {
            "/pets/1" if request.method == Method::Get => {
                HttpResponse::new(200).with_body(r#"{"id": 1}"#)
            }
            "/pets/2147483647" => HttpResponse::new(404).with_body("Pet not found"),
            _ => HttpResponse::new(405),
        })
    }
}

#[test]
fn suite_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("api.yaml");
    std::fs::write(&definition, DEFINITION).unwrap();
    let config_path = dir.path().join("apiprobe.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "definition = \"api.yaml\"\n[filters]\ninclude = [\"examples\", \"error404\"]"
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let suite = Suite::new(&config).unwrap();
    let cases = suite.prepare().unwrap();
    assert_eq!(names(&cases), vec!["getPet/not_found", "getPet/default"]);

    let report = suite.run(&mut Petstore).unwrap();
    assert!(report.is_success(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.passed(), 2);
}

#[test]
fn suite_reports_missing_definition() {
    let config = Config {
        definition: "/nonexistent/api.json".into(),
        ..Config::default()
    };
    assert!(matches!(Suite::new(&config), Err(SuiteError::Definition(_))));
}
