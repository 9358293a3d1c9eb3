//! Walkers that enumerate everything a generation run must name: schemas,
//! responses, and tags.

pub mod responses;
pub mod schemas;
pub mod tags;

use crate::error::ResolveError;
use crate::naming::class_name::capitalize;
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::resolve::{RefResolver, escape_segment};
use crate::transform::name_normalizer::normalize_name;

pub use responses::{FoundResponse, ResponseMap, find_responses};
pub use schemas::{FoundSchema, SchemaMap, find_all_schemas};
pub use tags::discover_tags;

/// One operation of the document together with where it lives.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub item: &'a PathItem,
    pub method: HttpMethod,
    pub operation: &'a Operation,
}

impl OperationRef<'_> {
    /// Pointer to the operation, e.g. `#/paths/~1pets/get`.
    pub fn pointer(&self) -> String {
        format!(
            "#/paths/{}/{}",
            escape_segment(self.path),
            self.method.as_lower()
        )
    }
}

/// Every operation: paths in document order, methods in canonical order.
pub fn operations(spec: &OpenApiSpec) -> impl Iterator<Item = OperationRef<'_>> {
    spec.paths.iter().flat_map(|(path, item)| {
        item.operations().map(move |(method, operation)| OperationRef {
            path,
            item,
            method,
            operation,
        })
    })
}

/// A parameter as it applies to one operation.
#[derive(Debug, Clone)]
pub struct EffectiveParameter<'a> {
    pub source: &'a ParameterOrRef,
    pub parameter: &'a Parameter,
    pub pointer: String,
    /// Name the parameter's identifiers are built from: the wire name, with
    /// the location appended when an earlier parameter of the operation
    /// already folds to the same identifier (`petId` then `petIdQuery`).
    pub local_name: String,
}

/// Path-level parameters followed by the operation's own. An operation-level
/// parameter replaces a path-level one with the same name and location.
pub fn effective_parameters<'a>(
    resolver: &RefResolver<'a>,
    op: &OperationRef<'a>,
) -> Result<Vec<EffectiveParameter<'a>>, ResolveError> {
    let mut own = Vec::with_capacity(op.operation.parameters.len());
    for (i, source) in op.operation.parameters.iter().enumerate() {
        let parameter = resolver.parameter_of(source)?;
        own.push(EffectiveParameter {
            source,
            parameter,
            pointer: format!("{}/parameters/{i}", op.pointer()),
            local_name: parameter.name.clone(),
        });
    }

    let mut params = Vec::with_capacity(op.item.parameters.len() + own.len());
    for (i, source) in op.item.parameters.iter().enumerate() {
        let parameter = resolver.parameter_of(source)?;
        let overridden = own.iter().any(|p| {
            p.parameter.name == parameter.name && p.parameter.location == parameter.location
        });
        if overridden {
            continue;
        }
        params.push(EffectiveParameter {
            source,
            parameter,
            pointer: format!("#/paths/{}/parameters/{i}", escape_segment(op.path)),
            local_name: parameter.name.clone(),
        });
    }
    params.extend(own);

    let mut taken: Vec<String> = Vec::with_capacity(params.len());
    for param in &mut params {
        let fold = |name: &str| normalize_name(name).camel_case;
        if taken.contains(&fold(&param.local_name)) {
            let located = format!(
                "{}{}",
                param.parameter.name,
                capitalize(param.parameter.location.as_str())
            );
            let mut candidate = located.clone();
            let mut n = 2;
            while taken.contains(&fold(&candidate)) {
                candidate = format!("{located}{n}");
                n += 1;
            }
            param.local_name = candidate;
        }
        taken.push(fold(&param.local_name));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: "3.1.0"
info: { title: Params, version: "1" }
paths:
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema: { type: string }
      - $ref: "#/components/parameters/trace"
    get:
      parameters:
        - name: petId
          in: path
          required: true
          schema: { type: integer }
        - name: petId
          in: query
          schema: { type: string }
      responses: {}
    delete:
      responses: {}
components:
  parameters:
    trace:
      name: X-Trace
      in: header
"##;

    #[test]
    fn operations_visit_paths_then_canonical_methods() {
        let spec = parse::from_yaml(DOC).unwrap();
        let visited: Vec<_> = operations(&spec)
            .map(|op| format!("{} {}", op.method.as_str(), op.path))
            .collect();
        assert_eq!(visited, ["GET /pets/{petId}", "DELETE /pets/{petId}"]);
        let first = operations(&spec).next().unwrap();
        assert_eq!(first.pointer(), "#/paths/~1pets~1{petId}/get");
    }

    #[test]
    fn operation_parameters_override_path_parameters() {
        let spec = parse::from_yaml(DOC).unwrap();
        let resolver = RefResolver::new(&spec);
        let ops: Vec<_> = operations(&spec).collect();

        let get = effective_parameters(&resolver, &ops[0]).unwrap();
        let seen: Vec<_> = get
            .iter()
            .map(|p| (p.parameter.name.as_str(), p.parameter.location.as_str()))
            .collect();
        assert_eq!(
            seen,
            [("X-Trace", "header"), ("petId", "path"), ("petId", "query")]
        );
        assert_eq!(get[1].pointer, "#/paths/~1pets~1{petId}/get/parameters/0");
        let local: Vec<_> = get.iter().map(|p| p.local_name.as_str()).collect();
        assert_eq!(local, ["X-Trace", "petId", "petIdQuery"]);

        let delete = effective_parameters(&resolver, &ops[1]).unwrap();
        assert_eq!(delete.len(), 2);
        assert_eq!(delete[0].pointer, "#/paths/~1pets~1{petId}/parameters/0");
    }
}
