//! Schema discovery.
//!
//! Walks components, response bodies, request bodies and parameters and gives
//! every schema that needs a class a canonical name. Referenced schemas keep
//! the name of their components entry wherever they are used; inline schemas
//! are named after their position (`Pet` → `PetFood` → `PetFoodProducer`).

use std::collections::HashMap;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::classify::{SchemaKind, classify};
use crate::error::{NamingError, TransformError};
use crate::naming::class_name::{from_components_key, from_parent_and_property};
use crate::naming::operation::{operation_identity, parameter_schema_name, request_body_schema_name, response_body_schema_name};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::Response;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::resolve::{RefResolver, canonical_pointer, escape_segment, pointer_segments};

use super::{effective_parameters, operations};
use super::responses::ResponseMap;

/// Recursion depth at which discovery gives up on a hand-built document.
pub const MAX_DEPTH: usize = 64;

/// A named schema and where it was first found.
#[derive(Debug, Clone)]
pub struct FoundSchema<'a> {
    pub name: String,
    pub schema: &'a Schema,
    pub kind: SchemaKind,
    /// JSON pointer of the first occurrence.
    pub origin: String,
}

/// Canonical name → schema, in first-discovery order.
#[derive(Debug, Clone, Default)]
pub struct SchemaMap<'a> {
    entries: IndexMap<String, FoundSchema<'a>>,
    /// Canonical pointer of every visited schema position → its name,
    /// primitives included.
    positions: HashMap<String, String>,
}

impl<'a> SchemaMap<'a> {
    pub fn get(&self, name: &str) -> Option<&FoundSchema<'a>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoundSchema<'a>> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Schemas that become classes: objects and enums.
    pub fn emitted(&self) -> impl Iterator<Item = &FoundSchema<'a>> {
        self.iter().filter(|found| found.kind.is_emitted())
    }

    /// The name discovery gave the schema at `pointer`, in canonical form.
    pub fn named_at(&self, pointer: &str) -> Option<&str> {
        self.positions.get(pointer).map(String::as_str)
    }

    /// Class name for the terminal pointer of a schema `$ref`. A components
    /// entry is named by its key; any other position by what discovery named
    /// it, so `#/components/schemas/Pet/properties/food` is `PetFood`.
    pub fn reference_name(&self, terminal: &str) -> Result<String, TransformError> {
        let segments = pointer_segments(terminal)?;
        if let [components, schemas, key] = segments.as_slice()
            && components == "components"
            && schemas == "schemas"
        {
            return Ok(from_components_key(key)?);
        }
        self.named_at(&canonical_pointer(terminal)?)
            .map(str::to_string)
            .ok_or_else(|| {
                NamingError::UnnamedReference {
                    reference: terminal.to_string(),
                }
                .into()
            })
    }

    /// An identical schema under a taken name is a repeat, not a collision.
    fn insert(&mut self, found: FoundSchema<'a>) -> Result<(), NamingError> {
        match self.entries.entry(found.name.clone()) {
            Entry::Occupied(existing) => {
                let existing = existing.get();
                if existing.schema == found.schema {
                    return Ok(());
                }
                Err(NamingError::NameCollision {
                    name: found.name,
                    first: existing.origin.clone(),
                    second: found.origin,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(found);
                Ok(())
            }
        }
    }
}

/// Discover every named schema of the document.
///
/// Order: `components.schemas`, response bodies (in `responses` order),
/// `components.requestBodies`, `components.parameters`, then the inline
/// request bodies and parameters of each operation.
pub fn find_all_schemas<'a>(
    spec: &'a OpenApiSpec,
    resolver: &RefResolver<'a>,
    responses: &ResponseMap<'a>,
) -> Result<SchemaMap<'a>, TransformError> {
    let mut finder = Finder {
        resolver,
        found: SchemaMap::default(),
        active: Vec::new(),
    };

    for (key, schema) in spec.component_schemas() {
        let pointer = format!("#/components/schemas/{}", escape_segment(key));
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                // Aliases collapse onto the schema they point to.
                resolver.resolve_schema_chain(ref_path)?;
            }
            SchemaOrRef::Schema(schema) => {
                finder.visit(from_components_key(key)?, schema, pointer)?;
            }
        }
    }

    for response in responses.iter() {
        let found: &'a Response = response.response;
        if let Some((media, mt)) = found.json_content()
            && let Some(SchemaOrRef::Schema(schema)) = &mt.schema
        {
            let pointer = format!(
                "{}/content/{}/schema",
                response.origin,
                escape_segment(media)
            );
            finder.visit(response_body_schema_name(&response.name), schema, pointer)?;
        }
    }

    if let Some(components) = &spec.components {
        for (key, body) in &components.request_bodies {
            let pointer = format!("#/components/requestBodies/{}", escape_segment(key));
            match body {
                RequestBodyOrRef::Ref { ref_path } => {
                    resolver.resolve_request_body(ref_path)?;
                }
                RequestBodyOrRef::RequestBody(body) => {
                    let name = request_body_schema_name(&from_components_key(key)?);
                    finder.request_body(name, body, &pointer)?;
                }
            }
        }
        for (key, param) in &components.parameters {
            let pointer = format!("#/components/parameters/{}", escape_segment(key));
            match param {
                ParameterOrRef::Ref { ref_path } => {
                    resolver.resolve_parameter(ref_path)?;
                }
                ParameterOrRef::Parameter(param) => {
                    if let Some(schema) = &param.schema {
                        let name = format!("{}Parameter", from_components_key(key)?);
                        finder.child(name, schema, format!("{pointer}/schema"))?;
                    }
                }
            }
        }
    }

    for op in operations(spec) {
        let identity = operation_identity(op.method, op.path, op.operation);
        if let Some(RequestBodyOrRef::RequestBody(body)) = &op.operation.request_body {
            let pointer = format!("{}/requestBody", op.pointer());
            finder.request_body(request_body_schema_name(&identity), body, &pointer)?;
        }

        for param in effective_parameters(resolver, &op)? {
            if let ParameterOrRef::Parameter(inline) = param.source
                && let Some(schema) = &inline.schema
            {
                let name = parameter_schema_name(&identity, &param.local_name);
                finder.child(name, schema, format!("{}/schema", param.pointer))?;
            }
        }
    }

    log::debug!("discovered {} schemas", finder.found.len());
    Ok(finder.found)
}

struct Finder<'r, 'a> {
    resolver: &'r RefResolver<'a>,
    found: SchemaMap<'a>,
    /// Names being expanded on the current recursion path.
    active: Vec<String>,
}

impl<'a> Finder<'_, 'a> {
    fn request_body(
        &mut self,
        name: String,
        body: &'a RequestBody,
        pointer: &str,
    ) -> Result<(), TransformError> {
        if let Some((media, mt)) = body.json_content()
            && let Some(schema) = &mt.schema
        {
            let pointer = format!("{pointer}/content/{}/schema", escape_segment(media));
            self.child(name, schema, pointer)?;
        }
        Ok(())
    }

    /// A schema position: references are checked and left alone, inline
    /// schemas are named `name` and walked.
    fn child(
        &mut self,
        name: String,
        schema: &'a SchemaOrRef,
        pointer: String,
    ) -> Result<(), TransformError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                self.resolver.resolve_schema_chain(ref_path)?;
                Ok(())
            }
            SchemaOrRef::Schema(schema) => self.visit(name, schema, pointer),
        }
    }

    fn visit(
        &mut self,
        name: String,
        schema: &'a Schema,
        pointer: String,
    ) -> Result<(), TransformError> {
        if self.active.iter().any(|active| *active == name) || self.active.len() >= MAX_DEPTH {
            let mut chain = self.active.clone();
            chain.push(name);
            return Err(NamingError::CyclicSchema { chain }.into());
        }

        self.found.positions.insert(pointer.clone(), name.clone());

        let kind = classify(schema);
        // Primitive leaves name nothing below them except composition members.
        // An identical schema met again under the same name is still walked,
        // so references into this copy find their names too.
        if kind != SchemaKind::Primitive {
            self.found.insert(FoundSchema {
                name: name.clone(),
                schema,
                kind,
                origin: pointer.clone(),
            })?;
        }

        self.active.push(name.clone());
        let result = self.walk(&name, schema, &pointer);
        self.active.pop();
        result
    }

    fn walk(&mut self, name: &str, schema: &'a Schema, pointer: &str) -> Result<(), TransformError> {
        for (property, child) in &schema.properties {
            self.child(
                from_parent_and_property(name, property),
                child,
                format!("{pointer}/properties/{}", escape_segment(property)),
            )?;
        }

        if let Some(child) = schema.additional_properties_schema() {
            self.child(
                from_parent_and_property(name, "additionalProperty"),
                child,
                format!("{pointer}/additionalProperties"),
            )?;
        }

        if let Some(items) = &schema.items {
            self.child(
                from_parent_and_property(name, "item"),
                items,
                format!("{pointer}/items"),
            )?;
        }

        // Inline allOf members are merged into the schema that holds them,
        // so their children are named after it.
        for (i, member) in schema.all_of.iter().enumerate() {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    self.resolver.resolve_schema_chain(ref_path)?;
                }
                SchemaOrRef::Schema(member) => {
                    self.walk(name, member, &format!("{pointer}/allOf/{i}"))?;
                }
            }
        }

        for (keyword, members) in [("oneOf", &schema.one_of), ("anyOf", &schema.any_of)] {
            for (i, member) in members.iter().enumerate() {
                self.child(
                    from_parent_and_property(name, &format!("{keyword}{}", i + 1)),
                    member,
                    format!("{pointer}/{keyword}/{i}"),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::find_responses;
    use crate::parse;

    fn discover(doc: &str) -> Result<Vec<(String, SchemaKind)>, TransformError> {
        let spec = parse::from_yaml(doc).unwrap();
        let resolver = RefResolver::new(&spec);
        let responses = find_responses(&spec, &resolver)?;
        let map = find_all_schemas(&spec, &resolver, &responses)?;
        Ok(map.iter().map(|f| (f.name.clone(), f.kind)).collect())
    }

    fn names(doc: &str) -> Vec<String> {
        discover(doc).unwrap().into_iter().map(|(n, _)| n).collect()
    }

    const HEADER: &str = "openapi: \"3.1.0\"\ninfo: { title: T, version: \"1\" }\n";

    #[test]
    fn nested_inline_objects_compose_names() {
        let doc = format!(
            "{HEADER}{}",
            r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        food:
          type: object
          properties:
            brand: { type: string }
            producer:
              type: object
              properties:
                name: { type: string }
"#
        );
        assert_eq!(names(&doc), ["Pet", "PetFood", "PetFoodProducer"]);
    }

    #[test]
    fn items_and_additional_properties_use_roles() {
        let doc = format!(
            "{HEADER}{}",
            r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        tags:
          type: array
          items:
            type: object
            properties:
              label: { type: string }
        labels:
          type: object
          additionalProperties:
            type: string
            enum: [a, b]
"#
        );
        let found = discover(&doc).unwrap();
        assert_eq!(
            found,
            [
                ("Pet".to_string(), SchemaKind::Object),
                ("PetTags".to_string(), SchemaKind::Array),
                ("PetTagsItem".to_string(), SchemaKind::Object),
                ("PetLabels".to_string(), SchemaKind::Object),
                ("PetLabelsAdditionalProperty".to_string(), SchemaKind::EnumOfStrings),
            ]
        );
    }

    #[test]
    fn composition_members() {
        let doc = format!(
            "{HEADER}{}",
            r##"
components:
  schemas:
    Base:
      type: object
      properties:
        id: { type: integer }
    Dog:
      allOf:
        - $ref: "#/components/schemas/Base"
        - type: object
          properties:
            collar:
              type: object
              properties:
                size: { type: integer }
    Owner:
      oneOf:
        - $ref: "#/components/schemas/Dog"
        - type: object
          properties:
            name: { type: string }
"##
        );
        assert_eq!(
            names(&doc),
            ["Base", "Dog", "DogCollar", "OwnerOneOf2"]
        );
    }

    #[test]
    fn alias_entries_are_not_inserted() {
        let doc = format!(
            "{HEADER}{}",
            r##"
components:
  schemas:
    Pet:
      type: object
    Animal:
      $ref: "#/components/schemas/Pet"
"##
        );
        assert_eq!(names(&doc), ["Pet"]);
    }

    #[test]
    fn request_bodies_and_parameters() {
        let doc = format!(
            "{HEADER}{}",
            r##"
paths:
  /pets:
    parameters:
      - name: sort-order
        in: query
        schema: { type: string, enum: [asc, desc] }
    post:
      operationId: addPet
      parameters:
        - name: limit
          in: query
          schema: { type: integer }
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: { type: string }
      responses:
        "204": { description: empty }
components:
  requestBodies:
    pet-body:
      content:
        application/json:
          schema:
            type: object
  parameters:
    page:
      name: page
      in: query
      schema: { type: integer, enum: [1, 2] }
"##
        );
        assert_eq!(
            names(&doc),
            [
                "PetBodyRequestBody",
                "PageParameter",
                "AddPetRequestBody",
                "AddPetSortOrderParameter",
            ]
        );
    }

    #[test]
    fn identical_rediscovery_is_merged() {
        let doc = format!(
            "{HEADER}{}",
            r#"
paths:
  /a:
    get:
      operationId: same
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { type: object }
components:
  schemas:
    Same200ResponseJsonSchema:
      type: object
"#
        );
        assert_eq!(names(&doc), ["Same200ResponseJsonSchema"]);
    }

    #[test]
    fn distinct_schemas_under_one_name_collide() {
        let doc = format!(
            "{HEADER}{}",
            r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        food:
          type: object
          properties:
            brand: { type: string }
    PetFood:
      type: object
      properties:
        calories: { type: integer }
"#
        );
        match discover(&doc).unwrap_err() {
            TransformError::Naming(NamingError::NameCollision { name, first, second }) => {
                assert_eq!(name, "PetFood");
                assert_eq!(first, "#/components/schemas/Pet/properties/food");
                assert_eq!(second, "#/components/schemas/PetFood");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_named_inline_child_is_cyclic() {
        let doc = format!(
            "{HEADER}{}",
            r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        "@":
          type: object
"#
        );
        match discover(&doc).unwrap_err() {
            TransformError::Naming(NamingError::CyclicSchema { chain }) => {
                assert_eq!(chain, ["Pet", "Pet"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn broken_property_reference_fails() {
        let doc = format!(
            "{HEADER}{}",
            r##"
components:
  schemas:
    Pet:
      type: object
      properties:
        owner: { $ref: "#/components/schemas/Owner" }
"##
        );
        assert!(matches!(
            discover(&doc).unwrap_err(),
            TransformError::Resolve(crate::error::ResolveError::BrokenReference { .. })
        ));
    }

    #[test]
    fn invalid_components_key_fails() {
        let doc = format!(
            "{HEADER}{}",
            r#"
components:
  schemas:
    "pet food":
      type: object
"#
        );
        assert!(matches!(
            discover(&doc).unwrap_err(),
            TransformError::Naming(NamingError::InvalidComponentKey { .. })
        ));
    }

    #[test]
    fn same_parameter_name_in_two_locations() {
        let doc = format!(
            "{HEADER}{}",
            r##"
paths:
  /pets/{petId}:
    get:
      parameters:
        - name: petId
          in: path
          required: true
          schema: { type: string, enum: [a, b] }
        - name: petId
          in: query
          schema: { type: string, enum: [c, d] }
      responses:
        "204": { description: empty }
"##
        );
        assert_eq!(
            names(&doc),
            ["GetPetsByPetIdPetIdParameter", "GetPetsByPetIdPetIdQueryParameter"]
        );
    }

    #[test]
    fn positions_are_named_for_references() {
        let doc = format!(
            "{HEADER}{}",
            r##"
components:
  schemas:
    Pet:
      type: object
      properties:
        food:
          type: object
          properties:
            brand: { type: string }
        name: { type: string }
        status:
          description: current status
          allOf:
            - $ref: "#/components/schemas/Status"
    Status:
      type: string
      enum: [available, sold]
"##
        );
        let spec = parse::from_yaml(&doc).unwrap();
        let resolver = RefResolver::new(&spec);
        let responses = find_responses(&spec, &resolver).unwrap();
        let map = find_all_schemas(&spec, &resolver, &responses).unwrap();

        let names: Vec<_> = map.names().collect();
        assert_eq!(names, ["Pet", "PetFood", "Status"]);
        assert_eq!(
            map.named_at("#/components/schemas/Pet/properties/name"),
            Some("PetName")
        );
        assert_eq!(
            map.reference_name("#/components/schemas/Pet/properties/food").unwrap(),
            "PetFood"
        );
        assert_eq!(
            map.reference_name("#/components/schemas/Status").unwrap(),
            "Status"
        );
        assert!(matches!(
            map.reference_name("#/components/schemas/Pet/properties/status/allOf/0"),
            Err(TransformError::Naming(NamingError::UnnamedReference { .. }))
        ));
    }
}
