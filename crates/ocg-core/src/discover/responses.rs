use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::{NamingError, TransformError};
use crate::naming::{from_components_key, operation_identity, response_class_name};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::resolve::{RefResolver, canonical_pointer, escape_segment};

use super::operations;

/// A response that gets its own class.
#[derive(Debug, Clone)]
pub struct FoundResponse<'a> {
    pub name: String,
    pub response: &'a Response,
    /// Status key for inline operation responses; `None` for components.
    pub status: Option<String>,
    pub origin: String,
}

/// Responses keyed by class name, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ResponseMap<'a> {
    entries: IndexMap<String, FoundResponse<'a>>,
}

impl<'a> ResponseMap<'a> {
    pub fn get(&self, name: &str) -> Option<&FoundResponse<'a>> {
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

    pub fn iter(&self) -> impl Iterator<Item = &FoundResponse<'a>> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The class of the response found at `pointer`, in canonical form.
    pub fn named_at(&self, pointer: &str) -> Option<&str> {
        self.iter()
            .find(|found| found.origin == pointer)
            .map(|found| found.name.as_str())
    }

    fn insert(&mut self, found: FoundResponse<'a>) -> Result<(), NamingError> {
        match self.entries.entry(found.name.clone()) {
            Entry::Occupied(existing) => {
                let existing = existing.get();
                if existing.response == found.response {
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

/// Enumerate every response class: `components.responses` first, then the
/// inline responses of every operation.
///
/// Operation responses given as `$ref` are not anonymous; they are checked
/// and left to their components entry.
pub fn find_responses<'a>(
    spec: &'a OpenApiSpec,
    resolver: &RefResolver<'a>,
) -> Result<ResponseMap<'a>, TransformError> {
    let mut map = ResponseMap::default();

    if let Some(components) = &spec.components {
        for (key, response) in &components.responses {
            let origin = format!("#/components/responses/{}", escape_segment(key));
            match response {
                ResponseOrRef::Ref { ref_path } => {
                    // Aliases share the class of the response they point to.
                    resolver.resolve_response(ref_path)?;
                }
                ResponseOrRef::Response(response) => {
                    map.insert(FoundResponse {
                        name: from_components_key(key)?,
                        response,
                        status: None,
                        origin,
                    })?;
                }
            }
        }
    }

    for op in operations(spec) {
        let identity = operation_identity(op.method, op.path, op.operation);
        for (status, response) in &op.operation.responses {
            match response {
                ResponseOrRef::Ref { ref_path } => {
                    resolver.resolve_response(ref_path)?;
                }
                ResponseOrRef::Response(response) => {
                    let name = response_class_name(&identity, status);
                    log::debug!("response {name} for {} {}", op.method.as_str(), op.path);
                    map.insert(FoundResponse {
                        name,
                        response,
                        status: Some(status.clone()),
                        origin: format!("{}/responses/{}", op.pointer(), escape_segment(status)),
                    })?;
                }
            }
        }
    }

    Ok(map)
}

/// Class name of an operation response: for a `$ref`, the class of the
/// response it lands on (a components entry or another operation's inline
/// response); the operation-derived name otherwise.
pub fn operation_response_name(
    resolver: &RefResolver<'_>,
    responses: &ResponseMap<'_>,
    identity: &str,
    status: &str,
    response: &ResponseOrRef,
) -> Result<String, TransformError> {
    match response {
        ResponseOrRef::Ref { ref_path } => {
            let (terminal, _) = resolver.resolve_response_chain(ref_path)?;
            responses
                .named_at(&canonical_pointer(&terminal)?)
                .map(str::to_string)
                .ok_or_else(|| NamingError::UnnamedReference { reference: terminal }.into())
        }
        ResponseOrRef::Response(_) => Ok(response_class_name(identity, status)),
    }
}
