use heck::ToLowerCamelCase;

use crate::parse::operation::{HttpMethod, Operation};

use super::class_name::capitalize;

/// Fold a path template into a name fragment.
///
/// `{param}` segments become `By<Param>`, every other segment is capitalized:
/// `/products/{categoryId}/details` → `ProductsByCategoryIdDetails`.
pub fn path_to_camel(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match path_parameter(segment) {
            Some(param) => format!("By{}", capitalize(param)),
            None => capitalize(segment),
        })
        .collect()
}

/// The parameter name of a segment that is exactly `{word}`.
fn path_parameter(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }
    Some(inner)
}

/// Client method name of an operation. An explicit operation id is used
/// verbatim; otherwise the name is the lowercase method followed by the
/// folded path.
pub fn method_name(method: HttpMethod, path: &str, operation: &Operation) -> String {
    match operation.explicit_id() {
        Some(id) => id.to_string(),
        None => format!("{}{}", method.as_lower(), path_to_camel(path)),
    }
}

/// A method name as an identifier: names that already are one are kept,
/// anything else is camel-cased (`list_all-pets` → `listAllPets`).
pub fn method_identifier(name: &str) -> String {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        return name.to_string();
    }
    let folded = name.to_lower_camel_case();
    if folded.is_empty() {
        "call".to_string()
    } else if folded.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{folded}")
    } else {
        folded
    }
}

/// Capitalized identity of an operation, the prefix of every class name
/// derived from it (responses, request bodies, parameter schemas).
pub fn operation_identity(method: HttpMethod, path: &str, operation: &Operation) -> String {
    match operation.explicit_id() {
        Some(id) => capitalize(id),
        None => format!("{}{}", capitalize(method.as_lower()), path_to_camel(path)),
    }
}

/// `<Identity><Status>Response`, with `default` kept as `Default`.
pub fn response_class_name(identity: &str, status: &str) -> String {
    format!("{identity}{}Response", capitalize(status))
}

/// Name of the inline JSON body schema of a response class.
pub fn response_body_schema_name(response_class: &str) -> String {
    format!("{response_class}JsonSchema")
}

/// Name of an operation's inline request body schema.
pub fn request_body_schema_name(identity: &str) -> String {
    format!("{identity}RequestBody")
}

/// Name of an inline parameter schema of an operation.
pub fn parameter_schema_name(identity: &str, parameter: &str) -> String {
    format!("{identity}{}Parameter", capitalize(parameter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: Option<&str>) -> Operation {
        Operation {
            operation_id: id.map(String::from),
            ..Operation::default()
        }
    }

    #[test]
    fn method_name_from_path() {
        assert_eq!(
            method_name(
                HttpMethod::Get,
                "/products/{categoryId}/{productId}/details",
                &op(None)
            ),
            "getProductsByCategoryIdByProductIdDetails"
        );
        assert_eq!(
            method_name(HttpMethod::Get, "/pets/{petId}", &op(None)),
            "getPetsByPetId"
        );
        assert_eq!(method_name(HttpMethod::Post, "/", &op(None)), "post");
    }

    #[test]
    fn explicit_id_is_verbatim() {
        assert_eq!(
            method_name(HttpMethod::Get, "/pets", &op(Some("list_all-pets"))),
            "list_all-pets"
        );
        assert_eq!(
            method_name(HttpMethod::Get, "/pets", &op(Some(""))),
            "getPets"
        );
    }

    #[test]
    fn method_identifiers() {
        assert_eq!(method_identifier("listPets"), "listPets");
        assert_eq!(method_identifier("list_all-pets"), "listAllPets");
        assert_eq!(method_identifier("2fa.verify"), "_2faVerify");
        assert_eq!(method_identifier("--"), "call");
    }

    #[test]
    fn segments_that_are_not_whole_parameters_are_capitalized() {
        assert_eq!(path_to_camel("/files/{id}.json"), "FilesIdJson");
        assert_eq!(path_to_camel("//pet-store//items/"), "PetStoreItems");
        assert_eq!(path_to_camel("/{}"), "");
    }

    #[test]
    fn response_names_share_identity_with_method_names() {
        let anonymous = op(None);
        let identity = operation_identity(HttpMethod::Get, "/pets/{petId}", &anonymous);
        assert_eq!(identity, "GetPetsByPetId");
        assert_eq!(
            response_class_name(&identity, "200"),
            "GetPetsByPetId200Response"
        );
        assert_eq!(
            response_body_schema_name(&response_class_name(&identity, "200")),
            "GetPetsByPetId200ResponseJsonSchema"
        );

        let named = op(Some("showPetById"));
        let identity = operation_identity(HttpMethod::Get, "/pets/{petId}", &named);
        assert_eq!(
            response_class_name(&identity, "default"),
            "ShowPetByIdDefaultResponse"
        );
    }

    #[test]
    fn request_and_parameter_schema_names() {
        assert_eq!(request_body_schema_name("AddPet"), "AddPetRequestBody");
        assert_eq!(
            parameter_schema_name("FindPets", "sort-order"),
            "FindPetsSortOrderParameter"
        );
    }
}
