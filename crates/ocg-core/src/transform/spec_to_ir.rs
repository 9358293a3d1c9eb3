use indexmap::IndexMap;

use crate::classify::SchemaKind;
use crate::discover::responses::operation_response_name;
use crate::discover::schemas::MAX_DEPTH;
use crate::discover::tags::group_operations;
use crate::discover::{
    FoundResponse, FoundSchema, OperationRef, ResponseMap, SchemaMap, effective_parameters,
    find_all_schemas, find_responses, operations,
};
use crate::error::{NamingError, TransformError};
use crate::ir::*;
use crate::naming::class_name::{capitalize, from_reference_path};
use crate::naming::operation::{
    method_identifier, method_name, operation_identity, parameter_schema_name, request_body_schema_name,
    response_body_schema_name,
};
use crate::parse::parameter::{ParameterLocation, ParameterOrRef};
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::resolve::{RefResolver, canonical_pointer, escape_segment};
use crate::type_hint::{
    NamingContext, TypeHints, TypeToken, resolve_raw_data_types, resolve_type_hints,
};

use super::name_normalizer::normalize_name;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "Api\\Client";

/// Options for building descriptors.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Root namespace; it qualifies names in emitters and never changes them.
    pub namespace: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Transform a parsed OpenAPI spec into emitter descriptors.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    transform_with_options(spec, &TransformOptions::default())
}

/// Transform with explicit options.
pub fn transform_with_options(
    spec: &OpenApiSpec,
    options: &TransformOptions,
) -> Result<IrSpec, TransformError> {
    // Phase 1: discovery over one resolver, so every lookup agrees
    let resolver = RefResolver::new(spec);
    let found_responses = find_responses(spec, &resolver)?;
    let found_schemas = find_all_schemas(spec, &resolver, &found_responses)?;

    let builder = Builder {
        resolver: &resolver,
        schemas: &found_schemas,
        responses: &found_responses,
    };

    // Phase 2: entities for every emitted schema
    let mut entities = Vec::new();
    for found in found_schemas.emitted() {
        if let Some(entity) = builder.entity(found)? {
            entities.push(entity);
        }
    }

    // Phase 3: response classes
    let responses = found_responses
        .iter()
        .map(|found| builder.response(found))
        .collect::<Result<Vec<_>, _>>()?;

    // Phase 4: operations, in path then canonical method order
    let operations = operations(spec)
        .map(|op| builder.operation(&op))
        .collect::<Result<Vec<_>, _>>()?;

    // Phase 5: one API façade per tag that has operations
    let apis = build_apis(spec, &operations)?;

    let info = IrInfo {
        title: spec.info.title.clone(),
        description: spec.info.description.clone(),
        version: spec.info.version.clone(),
        license: spec
            .info
            .license
            .as_ref()
            .map(|l| l.identifier.clone().unwrap_or_else(|| l.name.clone())),
    };

    let servers = spec
        .servers
        .iter()
        .map(|s| IrServer {
            url: s.expanded_url(),
            description: s.description.clone(),
        })
        .collect();

    log::debug!(
        "built {} entities, {} responses, {} operations, {} apis",
        entities.len(),
        responses.len(),
        operations.len(),
        apis.len()
    );

    Ok(IrSpec {
        info,
        servers,
        namespace: options.namespace.clone(),
        entities,
        responses,
        operations,
        apis,
    })
}

/// A property gathered from a schema and its `allOf` members, with the name
/// of the class its inline children are named after.
struct PropertySource<'a> {
    key: &'a str,
    schema: &'a SchemaOrRef,
    parent: String,
}

struct Builder<'r, 'a> {
    resolver: &'r RefResolver<'a>,
    schemas: &'r SchemaMap<'a>,
    responses: &'r ResponseMap<'a>,
}

impl<'a> Builder<'_, 'a> {
    fn entity(&self, found: &FoundSchema<'a>) -> Result<Option<IrEntity>, TransformError> {
        let schema = found.schema;
        let mut entity = IrEntity {
            name: found.name.clone(),
            kind: found.kind,
            description: schema.description.clone().or_else(|| schema.title.clone()),
            properties: Vec::new(),
            additional_properties: None,
            enum_cases: EnumCaseTable::default(),
            deprecated: schema.deprecated.unwrap_or(false),
        };

        match found.kind {
            SchemaKind::Object => {
                let mut sources = IndexMap::new();
                let mut required = Vec::new();
                self.collect_properties(schema, &found.name, &mut sources, &mut required, 0)?;
                for source in sources.into_values() {
                    let is_required = required.iter().any(|r| r == source.key);
                    entity.properties.push(self.property(source, is_required)?);
                }
                entity.additional_properties = self.additional_properties(schema, &found.name)?;
            }
            SchemaKind::EnumOfStrings | SchemaKind::EnumOfIntegers | SchemaKind::EnumOfMixedScalars => {
                entity.enum_cases = EnumCaseTable::from_values(&schema.enum_values);
            }
            SchemaKind::Array | SchemaKind::Primitive => return Ok(None),
        }

        Ok(Some(entity))
    }

    /// Properties of `schema` merged with those of its `allOf` members.
    /// Members come first; a later definition of a key replaces an earlier
    /// one in place.
    fn collect_properties(
        &self,
        schema: &'a Schema,
        parent: &str,
        out: &mut IndexMap<&'a str, PropertySource<'a>>,
        required: &mut Vec<String>,
        depth: usize,
    ) -> Result<(), TransformError> {
        if depth >= MAX_DEPTH {
            return Err(NamingError::CyclicSchema {
                chain: vec![parent.to_string()],
            }
            .into());
        }

        for member in &schema.all_of {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    let (terminal, target) = self.resolver.resolve_schema_target(ref_path)?;
                    let name = self.schemas.reference_name(&terminal)?;
                    self.collect_properties(target, &name, out, required, depth + 1)?;
                }
                SchemaOrRef::Schema(inline) => {
                    self.collect_properties(inline, parent, out, required, depth + 1)?;
                }
            }
        }

        for (key, property) in &schema.properties {
            out.insert(
                key.as_str(),
                PropertySource {
                    key: key.as_str(),
                    schema: property,
                    parent: parent.to_string(),
                },
            );
        }
        required.extend(schema.required.iter().cloned());
        Ok(())
    }

    fn property(
        &self,
        source: PropertySource<'a>,
        required: bool,
    ) -> Result<IrProperty, TransformError> {
        let ctx = NamingContext::new(source.parent, source.key);
        let hints = resolve_type_hints(self.resolver, self.schemas, Some(source.schema), &ctx)?;
        let raw_hints =
            resolve_raw_data_types(self.resolver, self.schemas, Some(source.schema), &ctx)?;
        let resolved = self.resolver.schema_of(source.schema)?;

        Ok(IrProperty {
            name: normalize_name(source.key),
            original_name: source.key.to_string(),
            factory: self.factory(&hints),
            hints,
            raw_hints,
            required,
            description: resolved.description.clone(),
            read_only: resolved.read_only.unwrap_or(false),
            write_only: resolved.write_only.unwrap_or(false),
        })
    }

    fn additional_properties(
        &self,
        schema: &'a Schema,
        name: &str,
    ) -> Result<Option<IrAdditionalProperties>, TransformError> {
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(values)) => {
                let ctx = NamingContext::new(name, "additionalProperty");
                let hints = resolve_type_hints(self.resolver, self.schemas, Some(values), &ctx)?;
                let raw_hints =
                    resolve_raw_data_types(self.resolver, self.schemas, Some(values), &ctx)?;
                Ok(Some(IrAdditionalProperties {
                    factory: self.factory(&hints),
                    hints,
                    raw_hints,
                }))
            }
            Some(AdditionalProperties::Bool(true)) => Ok(Some(IrAdditionalProperties {
                hints: TypeHints::single(TypeToken::Mixed),
                raw_hints: TypeHints::single(TypeToken::Mixed),
                factory: IrFactory::Direct,
            })),
            Some(AdditionalProperties::Bool(false)) | None => Ok(None),
        }
    }

    /// How a value with these hints is built from decoded JSON. Only
    /// single-class (optionally nullable) hints and lists of them have a
    /// factory; unions are passed through.
    fn factory(&self, hints: &TypeHints) -> IrFactory {
        let tokens = hints.without_null();
        let [token] = tokens.tokens() else {
            return IrFactory::Direct;
        };
        match token {
            TypeToken::Class(name) => match self.schemas.get(name).map(|found| found.kind) {
                Some(kind) if kind.is_enum() => IrFactory::Enum(name.clone()),
                Some(SchemaKind::Object) => IrFactory::Object(name.clone()),
                _ => {
                    log::warn!("type {name} has no generated class; value passed through");
                    IrFactory::Direct
                }
            },
            TypeToken::Array(items) => match self.factory(items) {
                IrFactory::Direct => IrFactory::Direct,
                inner => IrFactory::List(Box::new(inner)),
            },
            _ => IrFactory::Direct,
        }
    }

    fn response(&self, found: &FoundResponse<'a>) -> Result<IrResponse, TransformError> {
        let body = match found.response.json_content() {
            Some((content_type, media)) => {
                let ctx = NamingContext::root(response_body_schema_name(&found.name));
                let hints =
                    resolve_type_hints(self.resolver, self.schemas, media.schema.as_ref(), &ctx)?;
                let raw_hints =
                    resolve_raw_data_types(self.resolver, self.schemas, media.schema.as_ref(), &ctx)?;
                Some(IrResponseBody {
                    content_type: content_type.to_string(),
                    factory: self.factory(&hints),
                    hints,
                    raw_hints,
                })
            }
            None => {
                if !found.response.is_empty() {
                    log::warn!("{}: no JSON media type, body ignored", found.origin);
                }
                None
            }
        };

        Ok(IrResponse {
            name: found.name.clone(),
            status: found.status.clone(),
            description: found.response.description.clone(),
            body,
        })
    }

    /// Name of the inline schema of the request body at `pointer`: what
    /// discovery named it, else derived from the components key or the
    /// operation.
    fn request_body_name(
        &self,
        pointer: &str,
        content_type: &str,
        identity: &str,
    ) -> Result<String, TransformError> {
        let schema_pointer = format!("{pointer}/content/{}/schema", escape_segment(content_type));
        if let Some(name) = self.schemas.named_at(&schema_pointer) {
            return Ok(name.to_string());
        }
        if pointer.starts_with("#/components/") {
            return Ok(request_body_schema_name(&from_reference_path(pointer)?));
        }
        Ok(request_body_schema_name(identity))
    }

    fn operation(&self, op: &OperationRef<'a>) -> Result<IrOperation, TransformError> {
        let identity = operation_identity(op.method, op.path, op.operation);

        let mut parameters = Vec::new();
        for param in effective_parameters(self.resolver, op)? {
            // The parameter's own position, wherever a `$ref` leads.
            let position = match param.source {
                ParameterOrRef::Ref { ref_path } => {
                    let (terminal, _) = self.resolver.resolve_parameter_chain(ref_path)?;
                    canonical_pointer(&terminal)?
                }
                ParameterOrRef::Parameter(_) => param.pointer.clone(),
            };
            let ctx = NamingContext::root(
                self.schemas
                    .named_at(&format!("{position}/schema"))
                    .map(str::to_string)
                    .unwrap_or_else(|| parameter_schema_name(&identity, &param.local_name)),
            );
            let p = param.parameter;
            let location = match p.location {
                ParameterLocation::Path => IrParameterLocation::Path,
                ParameterLocation::Query => IrParameterLocation::Query,
                ParameterLocation::Header => IrParameterLocation::Header,
                ParameterLocation::Cookie => IrParameterLocation::Cookie,
            };
            parameters.push(IrParameter {
                name: normalize_name(&param.local_name),
                original_name: p.name.clone(),
                location,
                hints: resolve_type_hints(self.resolver, self.schemas, p.schema.as_ref(), &ctx)?,
                required: p.required || location == IrParameterLocation::Path,
                description: p.description.clone(),
                deprecated: p.deprecated.unwrap_or(false),
            });
        }

        let request_body = match &op.operation.request_body {
            Some(body) => {
                let (pointer, body) = match body {
                    RequestBodyOrRef::Ref { ref_path } => {
                        let (terminal, body) = self.resolver.resolve_request_body_chain(ref_path)?;
                        (canonical_pointer(&terminal)?, body)
                    }
                    RequestBodyOrRef::RequestBody(body) => (format!("{}/requestBody", op.pointer()), body),
                };
                match body.json_content() {
                    Some((content_type, media)) => Some(IrRequestBody {
                        hints: resolve_type_hints(
                            self.resolver,
                            self.schemas,
                            media.schema.as_ref(),
                            &NamingContext::root(self.request_body_name(
                                &pointer,
                                content_type,
                                &identity,
                            )?),
                        )?,
                        required: body.required,
                        content_type: content_type.to_string(),
                        description: body.description.clone(),
                    }),
                    None => {
                        log::warn!("{}: request body has no JSON media type, skipped", op.pointer());
                        None
                    }
                }
            }
            None => None,
        };

        let mut responses = Vec::with_capacity(op.operation.responses.len());
        for (status, response) in &op.operation.responses {
            responses.push(IrOperationResponse {
                status: status.clone(),
                class_name: operation_response_name(
                    self.resolver,
                    self.responses,
                    &identity,
                    status,
                    response,
                )?,
            });
        }

        Ok(IrOperation {
            method_name: method_name(op.method, op.path, op.operation),
            http_method: op.method,
            path: op.path.to_string(),
            summary: op.operation.summary.clone(),
            description: op.operation.description.clone(),
            tags: op.operation.tags.clone(),
            parameters,
            request_body,
            responses,
            deprecated: op.operation.deprecated.unwrap_or(false),
        })
    }
}

/// Class name of the façade for a tag: `pet store` → `PetStoreApi`.
pub fn api_class_name(tag: &str) -> String {
    let base = capitalize(tag);
    if base.is_empty() {
        "DefaultApi".to_string()
    } else if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{base}Api")
    } else {
        format!("{base}Api")
    }
}

fn build_apis(spec: &OpenApiSpec, operations: &[IrOperation]) -> Result<Vec<IrApi>, TransformError> {
    let mut apis: Vec<IrApi> = Vec::new();
    for (tag, ops) in group_operations(spec) {
        if tag.is_empty() {
            log::debug!("{} operations carry an empty tag, no API class", ops.len());
            continue;
        }
        if ops.is_empty() {
            log::debug!("tag '{tag}' has no operations, no API class");
            continue;
        }
        let class_name = api_class_name(&tag);
        if let Some(existing) = apis.iter().find(|api| api.class_name == class_name) {
            return Err(NamingError::NameCollision {
                name: class_name,
                first: format!("tag '{}'", existing.tag.original),
                second: format!("tag '{tag}'"),
            }
            .into());
        }
        check_method_names(&class_name, &ops, operations)?;
        let description = spec.tag(&tag).and_then(|t| t.description.clone());
        apis.push(IrApi {
            tag: normalize_name(&tag),
            class_name,
            description,
            operations: ops,
        });
    }
    Ok(apis)
}

/// Methods of one API must stay distinct once folded to identifiers;
/// method names are compared case-insensitively.
fn check_method_names(
    class_name: &str,
    members: &[usize],
    operations: &[IrOperation],
) -> Result<(), NamingError> {
    let mut seen: IndexMap<String, &IrOperation> = IndexMap::new();
    for op in members.iter().filter_map(|&i| operations.get(i)) {
        let identifier = method_identifier(&op.method_name);
        if let Some(first) = seen.get(&identifier.to_ascii_lowercase()) {
            return Err(NamingError::NameCollision {
                name: format!("{class_name}::{identifier}"),
                first: format!("{} {}", first.http_method.as_str(), first.path),
                second: format!("{} {}", op.http_method.as_str(), op.path),
            });
        }
        seen.insert(identifier.to_ascii_lowercase(), op);
    }
    Ok(())
}
