//! End-to-end scenarios: documents on disk → declarations → checks

use std::path::Path;
use std::sync::Arc;

use respcontract_core::{Config, ContractViolation, Deprecation, RecordingSink, Response};
use respcontract_validator::{
    ResponseContractChecker, load_declarations, load_response, load_spec,
};

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const PETSTORE_V2: &str = r#"
swagger: '2.0'
definitions:
  Pet:
    type: object
    properties:
      id: {type: integer}
      name: {type: string}
    required: [id]
"#;

const PETSTORE_V3: &str = r##"{
  "openapi": "3.0.3",
  "components": {
    "schemas": {
      "Pet": {
        "type": "object",
        "properties": {
          "id": {"type": "integer"},
          "name": {"type": "string"},
          "owner": {"$ref": "#/components/schemas/Owner"}
        },
        "required": ["id"]
      },
      "Owner": {
        "type": "object",
        "properties": {"email": {"type": "string"}}
      }
    }
  }
}"##;

const DECLARATIONS: &str = r#"
responses:
  - code: 200
    headers:
      X-Request-Id: {}
      X-Cache:
        required: false
        nullable: true
    schema:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
  - code: 404
    strict_mode: true
    schema:
      type: object
      properties:
        message: {type: string}
"#;

#[test]
fn table_driven_expectations_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let spec = load_spec(&write(dir.path(), "openapi.json", PETSTORE_V3)).unwrap();
    let declarations = load_declarations(&write(dir.path(), "pets.yaml", DECLARATIONS)).unwrap();

    let sink = Arc::new(RecordingSink::new());
    let checker = ResponseContractChecker::new().with_sink(sink.clone());
    let config = Config::default();

    let response = Response::new(200, r#"[{"id": 1, "owner": {"email": "a@b.c"}}]"#)
        .with_header("x-request-id", "r-1")
        .with_null_header("X-Cache");

    let results: Vec<Result<(), ContractViolation>> = declarations
        .responses
        .into_iter()
        .map(|d| checker.resolve(d, &config))
        .map(|exp| checker.check(&exp, &spec, &response))
        .collect();

    assert!(results[0].is_ok(), "200 declaration: {:?}", results[0]);
    assert!(matches!(
        results[1],
        Err(ContractViolation::StatusMismatch { .. })
    ));
    assert_eq!(
        sink.notices(),
        vec![Deprecation::LegacyStrictFlag { code: "404".into() }]
    );
}

#[test]
fn legacy_and_current_documents_resolve_the_same_schema() {
    let dir = tempfile::tempdir().unwrap();
    let v2 = load_spec(&write(dir.path(), "v2.yaml", PETSTORE_V2)).unwrap();
    let v3 = load_spec(&write(dir.path(), "v3.json", PETSTORE_V3)).unwrap();
    let checker = ResponseContractChecker::new().with_sink(Arc::new(RecordingSink::new()));

    let good = Response::new(200, r#"{"id": 3, "name": "rex"}"#);
    let bad = Response::new(200, r#"{"name": "rex"}"#);

    let v2_exp = respcontract_core::ExpectationRecord::new(200)
        .with_schema(serde_json::json!({"$ref": "#/definitions/Pet"}));
    let v3_exp = respcontract_core::ExpectationRecord::new(200)
        .with_schema(serde_json::json!({"$ref": "#/components/schemas/Pet"}));

    assert!(checker.check(&v2_exp, &v2, &good).is_ok());
    assert!(checker.check(&v3_exp, &v3, &good).is_ok());
    assert!(checker.check(&v2_exp, &v2, &bad).is_err());
    assert!(checker.check(&v3_exp, &v3, &bad).is_err());
}

#[test]
fn strict_config_default_closes_shared_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let spec = load_spec(&write(dir.path(), "v3.json", PETSTORE_V3)).unwrap();
    let declarations = load_declarations(&write(
        dir.path(),
        "decl.json",
        r##"{"responses": [{"code": 200, "schema": {"$ref": "#/components/schemas/Pet"}}]}"##,
    ))
    .unwrap();
    let checker = ResponseContractChecker::new().with_sink(Arc::new(RecordingSink::new()));
    let config = Config {
        strict: Some(true),
        ..Config::default()
    };

    let exp = checker.resolve(declarations.responses[0].clone(), &config);
    assert!(exp.strict);

    // `owner.email` is now mandatory and `owner` is closed
    let response = Response::new(
        200,
        r#"{"id": 1, "name": "rex", "owner": {"email": "a@b.c", "phone": "1"}}"#,
    );
    let err = checker.check(&exp, &spec, &response).unwrap_err();
    assert_eq!(err.kind(), "body_schema_mismatch");
}

#[test]
fn recorded_response_file_round_trips_through_checker() {
    let dir = tempfile::tempdir().unwrap();
    let spec = load_spec(&write(dir.path(), "v2.yaml", PETSTORE_V2)).unwrap();
    let response = load_response(&write(
        dir.path(),
        "resp.json",
        r#"{"code": "200", "headers": {}, "body": "not json"}"#,
    ))
    .unwrap();
    let checker = ResponseContractChecker::new().with_sink(Arc::new(RecordingSink::new()));
    let exp = respcontract_core::ExpectationRecord::new(200)
        .with_schema(serde_json::json!({"$ref": "#/definitions/Pet"}));

    let err = checker.check(&exp, &spec, &response).unwrap_err();
    assert!(matches!(err, ContractViolation::BodyNotJson { .. }));
}
