use minijinja::context;
use ocg_core::GeneratorError;
use ocg_core::ir::{IrFactory, IrResponse, IrResponseBody};
use serde::Serialize;

use super::{render, sub_namespace};
use crate::type_mapper::{hydrate, nullable, php_class_name, php_doc_type, php_string, php_type};

#[derive(Debug, Serialize)]
struct BodyCtx {
    content_type: String,
    native_type: String,
    doc_type: String,
    hydrate: String,
}

/// Emit `src/Response/<Name>.php`.
pub fn emit_response(response: &IrResponse, namespace: &str) -> Result<String, GeneratorError> {
    render(
        "response.php.j2",
        context! {
            namespace => sub_namespace(namespace, "Response"),
            name => php_class_name(&response.name, "Response"),
            description => Some(response.description.clone()).filter(|d| !d.is_empty()),
            status => response.status.as_deref().map(php_string),
            body => response.body.as_ref().map(|b| body_ctx(b, namespace)),
        },
    )
}

fn body_ctx(body: &IrResponseBody, namespace: &str) -> BodyCtx {
    // An empty payload decodes to null, so the body is always nullable.
    let native_type = nullable(&php_type(&body.hints, namespace));
    let mut doc_type = php_doc_type(&body.hints, namespace);
    if !body.hints.is_nullable() {
        doc_type = format!("{doc_type}|null");
    }
    let hydrate = match &body.factory {
        IrFactory::Direct => "$body".to_string(),
        factory => format!("$body === null ? null : {}", hydrate(factory, "$body", namespace)),
    };
    BodyCtx {
        content_type: body.content_type.clone(),
        native_type,
        doc_type,
        hydrate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocg_core::parse;
    use ocg_core::transform::transform;

    const DOC: &str = r##"
openapi: "3.1.0"
info: { title: Responses, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items: { $ref: "#/components/schemas/Pet" }
        "204":
          description: ""
components:
  schemas:
    Pet:
      type: object
      properties:
        id: { type: integer }
  responses:
    Problem:
      description: Something went wrong
      content:
        application/json:
          schema: { type: string }
"##;

    fn emit(name: &str) -> String {
        let spec = parse::from_yaml(DOC).unwrap();
        let ir = transform(&spec).unwrap();
        emit_response(ir.response(name).unwrap(), "Acme").unwrap()
    }

    #[test]
    fn test_operation_response_with_list_body() {
        let php = emit("ListPets200Response");
        assert!(php.contains("namespace Acme\\Response;"));
        assert!(php.contains(" * A list of pets\n"));
        assert!(php.contains("public const STATUS = '200';"));
        assert!(php.contains("@param list<\\Acme\\Model\\Pet>|null $body"));
        assert!(php.contains("public readonly ?array $body = null,"));
        assert!(php.contains(
            "body: $body === null ? null : array_map(static fn ($item) => \\Acme\\Model\\Pet::fromArray($item), $body),"
        ));
    }

    #[test]
    fn test_response_without_body() {
        let php = emit("ListPets204Response");
        assert!(php.contains(" * ListPets204Response\n"));
        assert!(!php.contains("$body = null"));
        assert!(php.contains("public const STATUS = '204';"));
    }

    #[test]
    fn test_components_response_has_no_status() {
        let php = emit("Problem");
        assert!(!php.contains("STATUS"));
        assert!(php.contains("public readonly ?string $body = null,"));
        assert!(php.contains("body: $body,"));
    }
}
