//! Typed `$ref` resolution over a parsed OpenAPI document.
//!
//! A reference is a local JSON pointer (`#/components/schemas/Pet`). The
//! resolver decodes it into segments and walks the document tree one typed
//! step at a time, so a pointer can land on any addressable node: a component,
//! an inline schema nested in a path operation, a response, a parameter.

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};
use crate::parse::spec::{Components, OpenApiSpec};

/// A node of the document tree addressed by a pointer.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a OpenApiSpec),
    Components(&'a Components),
    Paths(&'a IndexMap<String, PathItem>),
    PathItem(&'a PathItem),
    Operation(&'a Operation),
    Schema(&'a Schema),
    SchemaMap(&'a IndexMap<String, SchemaOrRef>),
    SchemaList(&'a [SchemaOrRef]),
    Response(&'a Response),
    ResponseMap(&'a IndexMap<String, ResponseOrRef>),
    Content(&'a IndexMap<String, MediaType>),
    MediaType(&'a MediaType),
    Parameter(&'a Parameter),
    ParameterMap(&'a IndexMap<String, ParameterOrRef>),
    ParameterList(&'a [ParameterOrRef]),
    RequestBody(&'a RequestBody),
    RequestBodyMap(&'a IndexMap<String, RequestBodyOrRef>),
    /// Another `$ref`. Pointers never traverse through one.
    Reference(&'a str),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Document(_) => "document",
            Node::Components(_) => "components object",
            Node::Paths(_) => "paths object",
            Node::PathItem(_) => "path item",
            Node::Operation(_) => "operation",
            Node::Schema(_) => "schema",
            Node::SchemaMap(_) => "schema map",
            Node::SchemaList(_) => "schema list",
            Node::Response(_) => "response",
            Node::ResponseMap(_) => "response map",
            Node::Content(_) => "content map",
            Node::MediaType(_) => "media type",
            Node::Parameter(_) => "parameter",
            Node::ParameterMap(_) => "parameter map",
            Node::ParameterList(_) => "parameter list",
            Node::RequestBody(_) => "request body",
            Node::RequestBodyMap(_) => "request body map",
            Node::Reference(_) => "reference",
        }
    }

    fn from_schema(s: &'a SchemaOrRef) -> Self {
        match s {
            SchemaOrRef::Ref { ref_path } => Node::Reference(ref_path),
            SchemaOrRef::Schema(schema) => Node::Schema(schema),
        }
    }

    fn from_response(r: &'a ResponseOrRef) -> Self {
        match r {
            ResponseOrRef::Ref { ref_path } => Node::Reference(ref_path),
            ResponseOrRef::Response(response) => Node::Response(response),
        }
    }

    fn from_parameter(p: &'a ParameterOrRef) -> Self {
        match p {
            ParameterOrRef::Ref { ref_path } => Node::Reference(ref_path),
            ParameterOrRef::Parameter(param) => Node::Parameter(param),
        }
    }

    fn from_request_body(b: &'a RequestBodyOrRef) -> Self {
        match b {
            RequestBodyOrRef::Ref { ref_path } => Node::Reference(ref_path),
            RequestBodyOrRef::RequestBody(body) => Node::RequestBody(body),
        }
    }

    /// Take one pointer step into this node.
    fn step(self, segment: &str) -> Option<Node<'a>> {
        match self {
            Node::Document(spec) => match segment {
                "components" => spec.components.as_ref().map(Node::Components),
                "paths" => Some(Node::Paths(&spec.paths)),
                _ => None,
            },
            Node::Components(c) => match segment {
                "schemas" => Some(Node::SchemaMap(&c.schemas)),
                "responses" => Some(Node::ResponseMap(&c.responses)),
                "parameters" => Some(Node::ParameterMap(&c.parameters)),
                "requestBodies" => Some(Node::RequestBodyMap(&c.request_bodies)),
                _ => None,
            },
            Node::Paths(paths) => paths.get(segment).map(Node::PathItem),
            Node::PathItem(item) => match segment {
                "parameters" => Some(Node::ParameterList(&item.parameters)),
                method => HttpMethod::CANONICAL_ORDER
                    .into_iter()
                    .find(|m| m.as_lower() == method)
                    .and_then(|m| item.operation(m))
                    .map(Node::Operation),
            },
            Node::Operation(op) => match segment {
                "responses" => Some(Node::ResponseMap(&op.responses)),
                "parameters" => Some(Node::ParameterList(&op.parameters)),
                "requestBody" => op.request_body.as_ref().map(Node::from_request_body),
                _ => None,
            },
            Node::Schema(schema) => match segment {
                "properties" => Some(Node::SchemaMap(&schema.properties)),
                "items" => schema.items.as_deref().map(Node::from_schema),
                "additionalProperties" => match &schema.additional_properties {
                    Some(AdditionalProperties::Schema(s)) => Some(Node::from_schema(s)),
                    _ => None,
                },
                "allOf" => Some(Node::SchemaList(&schema.all_of)),
                "oneOf" => Some(Node::SchemaList(&schema.one_of)),
                "anyOf" => Some(Node::SchemaList(&schema.any_of)),
                _ => None,
            },
            Node::SchemaMap(map) => map.get(segment).map(Node::from_schema),
            Node::SchemaList(list) => index(segment)
                .and_then(|i| list.get(i))
                .map(Node::from_schema),
            Node::Response(response) => match segment {
                "content" => Some(Node::Content(&response.content)),
                _ => None,
            },
            Node::ResponseMap(map) => map.get(segment).map(Node::from_response),
            Node::Content(content) => content.get(segment).map(Node::MediaType),
            Node::MediaType(mt) => match segment {
                "schema" => mt.schema.as_ref().map(Node::from_schema),
                _ => None,
            },
            Node::Parameter(param) => match segment {
                "schema" => param.schema.as_ref().map(Node::from_schema),
                _ => None,
            },
            Node::ParameterMap(map) => map.get(segment).map(Node::from_parameter),
            Node::ParameterList(list) => index(segment)
                .and_then(|i| list.get(i))
                .map(Node::from_parameter),
            Node::RequestBody(body) => match segment {
                "content" => Some(Node::Content(&body.content)),
                _ => None,
            },
            Node::RequestBodyMap(map) => map.get(segment).map(Node::from_request_body),
            Node::Reference(_) => None,
        }
    }
}

fn index(segment: &str) -> Option<usize> {
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}

/// Resolves `$ref` pointers against one document. Resolution results are
/// memoized for the lifetime of the resolver, which is one generation run.
pub struct RefResolver<'a> {
    spec: &'a OpenApiSpec,
    cache: RefCell<HashMap<String, Node<'a>>>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            spec,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn spec(&self) -> &'a OpenApiSpec {
        self.spec
    }

    /// Resolve a pointer to the node it addresses, without following a
    /// terminal `$ref`.
    pub fn resolve(&self, reference: &str) -> Result<Node<'a>, ResolveError> {
        if let Some(node) = self.cache.borrow().get(reference) {
            return Ok(*node);
        }

        let mut node = Node::Document(self.spec);
        for segment in pointer_segments(reference)? {
            node = node
                .step(&segment)
                .ok_or_else(|| ResolveError::BrokenReference {
                    reference: reference.to_string(),
                    segment: segment.clone(),
                })?;
        }

        self.cache
            .borrow_mut()
            .insert(reference.to_string(), node);
        Ok(node)
    }

    /// Resolve a schema reference, following `$ref` chains. Returns the last
    /// reference of the chain together with the schema it addresses; naming
    /// always uses that terminal reference.
    pub fn resolve_schema_chain(
        &self,
        reference: &str,
    ) -> Result<(String, &'a Schema), ResolveError> {
        self.follow(reference, "schema", |node| match node {
            Node::Schema(schema) => Some(schema),
            _ => None,
        })
    }

    /// Like [`RefResolver::resolve_schema_chain`], also looking through
    /// schemas that only annotate a single `allOf` reference, so
    /// `{description, allOf: [$ref: Status]}` lands on `Status`.
    pub fn resolve_schema_target(
        &self,
        reference: &str,
    ) -> Result<(String, &'a Schema), ResolveError> {
        let mut seen: Vec<String> = Vec::new();
        let mut next = reference.to_string();
        loop {
            let (terminal, schema) = self.resolve_schema_chain(&next)?;
            let Some(wrapped) = schema.wrapped_reference() else {
                return Ok((terminal, schema));
            };
            if seen.contains(&terminal) {
                seen.push(terminal);
                return Err(ResolveError::CircularRef(seen));
            }
            seen.push(terminal);
            next = wrapped.to_string();
        }
    }

    pub fn resolve_schema(&self, reference: &str) -> Result<&'a Schema, ResolveError> {
        self.resolve_schema_chain(reference).map(|(_, s)| s)
    }

    /// Like [`RefResolver::resolve_schema_chain`], for responses.
    pub fn resolve_response_chain(
        &self,
        reference: &str,
    ) -> Result<(String, &'a Response), ResolveError> {
        self.follow(reference, "response", |node| match node {
            Node::Response(response) => Some(response),
            _ => None,
        })
    }

    pub fn resolve_response(&self, reference: &str) -> Result<&'a Response, ResolveError> {
        self.resolve_response_chain(reference).map(|(_, r)| r)
    }

    pub fn resolve_parameter_chain(
        &self,
        reference: &str,
    ) -> Result<(String, &'a Parameter), ResolveError> {
        self.follow(reference, "parameter", |node| match node {
            Node::Parameter(param) => Some(param),
            _ => None,
        })
    }

    pub fn resolve_parameter(&self, reference: &str) -> Result<&'a Parameter, ResolveError> {
        self.resolve_parameter_chain(reference).map(|(_, p)| p)
    }

    pub fn resolve_request_body_chain(
        &self,
        reference: &str,
    ) -> Result<(String, &'a RequestBody), ResolveError> {
        self.follow(reference, "request body", |node| match node {
            Node::RequestBody(body) => Some(body),
            _ => None,
        })
    }

    pub fn resolve_request_body(&self, reference: &str) -> Result<&'a RequestBody, ResolveError> {
        self.resolve_request_body_chain(reference).map(|(_, b)| b)
    }

    /// Inline schemas are returned as-is, references are resolved.
    pub fn schema_of(&self, schema_or_ref: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => self.resolve_schema(ref_path),
            SchemaOrRef::Schema(schema) => Ok(&**schema),
        }
    }

    pub fn response_of(&self, response: &'a ResponseOrRef) -> Result<&'a Response, ResolveError> {
        match response {
            ResponseOrRef::Ref { ref_path } => self.resolve_response(ref_path),
            ResponseOrRef::Response(r) => Ok(r),
        }
    }

    pub fn parameter_of(&self, param: &'a ParameterOrRef) -> Result<&'a Parameter, ResolveError> {
        match param {
            ParameterOrRef::Ref { ref_path } => self.resolve_parameter(ref_path),
            ParameterOrRef::Parameter(p) => Ok(p),
        }
    }

    pub fn request_body_of(
        &self,
        body: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        match body {
            RequestBodyOrRef::Ref { ref_path } => self.resolve_request_body(ref_path),
            RequestBodyOrRef::RequestBody(b) => Ok(b),
        }
    }

    fn follow<T: ?Sized>(
        &self,
        reference: &str,
        expected: &'static str,
        pick: impl Fn(Node<'a>) -> Option<&'a T>,
    ) -> Result<(String, &'a T), ResolveError> {
        let mut chain = vec![reference.to_string()];
        loop {
            let current = chain.last().map(String::as_str).unwrap_or(reference);
            let node = self.resolve(current)?;
            if let Some(target) = pick(node) {
                return Ok((current.to_string(), target));
            }
            match node {
                Node::Reference(next) => {
                    if chain.iter().any(|seen| seen == next) {
                        chain.push(next.to_string());
                        return Err(ResolveError::CircularRef(chain));
                    }
                    chain.push(next.to_string());
                }
                other => {
                    return Err(ResolveError::UnexpectedTarget {
                        reference: current.to_string(),
                        expected,
                        found: other.kind(),
                    });
                }
            }
        }
    }
}

/// Split a local reference into decoded JSON-pointer segments.
pub fn pointer_segments(reference: &str) -> Result<Vec<String>, ResolveError> {
    let fragment = reference
        .strip_prefix('#')
        .ok_or_else(|| ResolveError::InvalidRefFormat(reference.to_string()))?;
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let rest = fragment
        .strip_prefix('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(reference.to_string()))?;
    Ok(rest.split('/').map(decode_segment).collect())
}

/// One spelling per pointer: segments decoded, then re-escaped. Discovery
/// records positions in this form, so any encoding of the same reference
/// finds them.
pub fn canonical_pointer(reference: &str) -> Result<String, ResolveError> {
    Ok(pointer_segments(reference)?
        .iter()
        .fold(String::from("#"), |mut out, segment| {
            out.push('/');
            out.push_str(&escape_segment(segment));
            out
        }))
}

/// Encode a map key as a pointer segment.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn decode_segment(raw: &str) -> String {
    percent_decode(raw).replace("~1", "/").replace("~0", "~")
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let Some(byte) = raw
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}
