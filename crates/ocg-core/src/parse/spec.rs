use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::PathItem;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::SchemaOrRef;
use super::server::Server;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// License information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Top-level OpenAPI 3.x document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApiSpec {
    /// The declared tag object for `name`; operations may use undeclared tags.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    pub fn component_schemas(&self) -> impl Iterator<Item = (&String, &SchemaOrRef)> {
        self.components.iter().flat_map(|c| c.schemas.iter())
    }
}

/// Reusable definitions addressed by `#/components/<section>/<key>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_and_component_schemas() {
        let spec: OpenApiSpec = serde_yaml_ng::from_str(
            r##"
openapi: 3.1.0
info: {title: Shop, version: "1"}
tags:
  - name: store
    description: Store operations
components:
  schemas:
    Order: {type: object}
    Alias: {$ref: "#/components/schemas/Order"}
"##,
        )
        .unwrap();
        assert_eq!(
            spec.tag("store").and_then(|t| t.description.as_deref()),
            Some("Store operations")
        );
        assert!(spec.tag("pet").is_none());
        let keys: Vec<&String> = spec.component_schemas().map(|(key, _)| key).collect();
        assert_eq!(keys, ["Order", "Alias"]);
    }

    #[test]
    fn documents_without_components_have_no_schemas() {
        let spec: OpenApiSpec =
            serde_yaml_ng::from_str("openapi: 3.1.0\ninfo: {title: Shop, version: '1'}\n").unwrap();
        assert_eq!(spec.component_schemas().count(), 0);
        assert!(spec.paths.is_empty());
    }
}
