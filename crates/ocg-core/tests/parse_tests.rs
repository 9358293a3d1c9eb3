use ocg_core::error::ParseError;
use ocg_core::parse;
use ocg_core::parse::operation::HttpMethod;
use ocg_core::parse::parameter::{ParameterLocation, ParameterOrRef};
use ocg_core::parse::request_body::RequestBodyOrRef;
use ocg_core::parse::response::ResponseOrRef;
use ocg_core::parse::schema::{AdditionalProperties, SchemaOrRef, SchemaType};

#[test]
fn test_parse_petstore() {
    let yaml = include_str!("fixtures/petstore.yaml");
    let spec = parse::from_yaml(yaml).expect("should parse petstore");

    assert_eq!(spec.openapi, "3.1.0");
    assert_eq!(spec.info.title, "Swagger Petstore");
    assert_eq!(spec.info.version, "1.0.0");
    assert_eq!(spec.info.license.as_ref().map(|l| l.name.as_str()), Some("MIT"));
    assert_eq!(spec.servers[0].url, "https://petstore.example.com/v1");
    assert!(spec.tags.is_empty());

    let paths: Vec<_> = spec.paths.keys().map(String::as_str).collect();
    assert_eq!(paths, ["/pet", "/pets/{petId}", "/store/inventory", "/health"]);

    let components = spec.components.as_ref().expect("should have components");
    let schemas: Vec<_> = components.schemas.keys().map(String::as_str).collect();
    assert_eq!(
        schemas,
        ["Pet", "Owner", "Mood", "pet_status", "Priority", "Error"]
    );
    assert!(components.request_bodies.contains_key("NewPet"));
    assert!(components.responses.contains_key("Error"));
}

#[test]
fn test_parse_operations_and_references() {
    let spec = parse::from_yaml(include_str!("fixtures/petstore.yaml")).unwrap();

    let pet = &spec.paths["/pet"];
    let methods: Vec<_> = pet.operations().map(|(m, _)| m).collect();
    assert_eq!(methods, [HttpMethod::Get, HttpMethod::Post]);

    let list = pet.get.as_ref().unwrap();
    assert_eq!(list.explicit_id(), Some("listPets"));
    assert_eq!(list.tags, ["pet"]);
    assert!(matches!(
        list.responses["default"],
        ResponseOrRef::Ref { ref ref_path } if ref_path == "#/components/responses/Error"
    ));

    let add = pet.post.as_ref().unwrap();
    assert!(matches!(
        add.request_body,
        Some(RequestBodyOrRef::Ref { ref ref_path }) if ref_path == "#/components/requestBodies/NewPet"
    ));

    let item = &spec.paths["/pets/{petId}"];
    assert_eq!(item.parameters.len(), 1);
    let ParameterOrRef::Parameter(pet_id) = &item.parameters[0] else {
        panic!("expected an inline path parameter");
    };
    assert_eq!(pet_id.location, ParameterLocation::Path);
    assert!(pet_id.required);
}

#[test]
fn test_parse_schema_shapes() {
    let spec = parse::from_yaml(include_str!("fixtures/petstore.yaml")).unwrap();
    let schemas = &spec.components.as_ref().unwrap().schemas;

    let pet = schemas["Pet"].as_schema().unwrap();
    assert!(pet.has_type(SchemaType::Object));
    assert!(pet.is_required("id"));
    assert!(!pet.is_required("food"));
    assert_eq!(
        pet.properties["mood"].as_ref_path(),
        Some("#/components/schemas/Mood")
    );

    let mood = schemas["Mood"].as_schema().unwrap();
    assert!(mood.schema_type.is_none());
    assert_eq!(mood.enum_values.len(), 4);

    let inventory = spec.paths["/store/inventory"].get.as_ref().unwrap();
    let ResponseOrRef::Response(ok) = &inventory.responses["200"] else {
        panic!("expected an inline response");
    };
    let Some(SchemaOrRef::Schema(body)) = &ok.content["application/json"].schema else {
        panic!("expected an inline body schema");
    };
    assert!(matches!(
        body.additional_properties,
        Some(AdditionalProperties::Schema(_))
    ));
}

#[test]
fn test_parse_json_document() {
    let json = r#"{
        "openapi": "3.1.0",
        "info": {"title": "Tiny", "version": "0.1"},
        "paths": {"/ping": {"get": {"responses": {"204": {"description": "pong"}}}}}
    }"#;
    let spec = parse::from_json(json).expect("should parse json");
    assert_eq!(spec.info.title, "Tiny");
    assert!(spec.components.is_none());
}

#[test]
fn test_openapi_30_documents_are_accepted() {
    let spec = parse::from_yaml("openapi: 3.0.3\ninfo: {title: Old, version: '1'}\npaths: {}\n")
        .expect("3.0 documents still parse");
    assert_eq!(spec.openapi, "3.0.3");
}

#[test]
fn test_unsupported_version_is_rejected() {
    let err = parse::from_yaml("openapi: 2.0.0\ninfo: {title: Old, version: '1'}\n").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "2.0.0"));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    assert!(matches!(
        parse::from_yaml("openapi: [unclosed"),
        Err(ParseError::Yaml(_))
    ));
}
