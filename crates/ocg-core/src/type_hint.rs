//! Type-hint resolution.
//!
//! Every property, parameter and body type is described as an ordered,
//! duplicate-free list of [`TypeToken`]s. Emitters join the tokens with their
//! language's union syntax; nothing downstream parses free-form type text.

use std::fmt;

use crate::classify::{SchemaKind, classify, scalar_enum_literals};
use crate::discover::SchemaMap;
use crate::error::TransformError;
use crate::naming::class_name::from_parent_and_property;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::resolve::RefResolver;

/// One member of a type union.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// Unknown or unconstrained.
    Mixed,
    /// A list whose elements have the given hints.
    Array(TypeHints),
    Float,
    Int,
    String,
    Bool,
    Null,
    /// A generated class, by canonical name.
    Class(String),
    /// A structured value passed through as decoded JSON.
    Untyped,
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeToken::Mixed => write!(f, "mixed"),
            TypeToken::Array(items) => write!(f, "array<{items}>"),
            TypeToken::Float => write!(f, "float"),
            TypeToken::Int => write!(f, "int"),
            TypeToken::String => write!(f, "string"),
            TypeToken::Bool => write!(f, "bool"),
            TypeToken::Null => write!(f, "null"),
            TypeToken::Class(name) => write!(f, "{name}"),
            TypeToken::Untyped => write!(f, "untyped"),
        }
    }
}

/// An ordered set of type tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeHints(Vec<TypeToken>);

impl TypeHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(token: TypeToken) -> Self {
        Self(vec![token])
    }

    /// Append a token unless it is already present.
    pub fn push(&mut self, token: TypeToken) {
        if !self.0.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn extend(&mut self, other: TypeHints) {
        for token in other.0 {
            self.push(token);
        }
    }

    pub fn tokens(&self) -> &[TypeToken] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeToken> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, token: &TypeToken) -> bool {
        self.0.contains(token)
    }

    pub fn is_nullable(&self) -> bool {
        self.contains(&TypeToken::Null) || self.contains(&TypeToken::Mixed)
    }

    /// The tokens other than `Null`.
    pub fn without_null(&self) -> TypeHints {
        self.iter()
            .filter(|t| **t != TypeToken::Null)
            .cloned()
            .collect()
    }
}

impl FromIterator<TypeToken> for TypeHints {
    fn from_iter<I: IntoIterator<Item = TypeToken>>(iter: I) -> Self {
        let mut hints = TypeHints::new();
        for token in iter {
            hints.push(token);
        }
        hints
    }
}

impl<'h> IntoIterator for &'h TypeHints {
    type Item = &'h TypeToken;
    type IntoIter = std::slice::Iter<'h, TypeToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TypeHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Where a schema sits, which decides the name of an inline class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub parent: String,
    pub property: Option<String>,
}

impl NamingContext {
    /// The schema under `property` of the class named `parent`.
    pub fn new(parent: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            property: Some(property.into()),
        }
    }

    /// A schema that is itself named `name`, such as a response body.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            parent: name.into(),
            property: None,
        }
    }

    /// The class name an inline object or enum gets in this position.
    pub fn derived_name(&self) -> String {
        match &self.property {
            Some(property) => from_parent_and_property(&self.parent, property),
            None => self.parent.clone(),
        }
    }
}

/// Resolve the output type of a schema position: enums and objects become
/// their class names. Referenced schemas are named the way discovery named
/// them in `schemas`.
pub fn resolve_type_hints<'a>(
    resolver: &RefResolver<'a>,
    schemas: &SchemaMap<'a>,
    schema: Option<&SchemaOrRef>,
    ctx: &NamingContext,
) -> Result<TypeHints, TransformError> {
    HintResolver::new(resolver, schemas, Mode::Typed).resolve(schema, ctx)
}

/// Resolve the wire type of a schema position: objects are untyped decoded
/// JSON and enums are their literal kinds. Factories use this for input.
pub fn resolve_raw_data_types<'a>(
    resolver: &RefResolver<'a>,
    schemas: &SchemaMap<'a>,
    schema: Option<&SchemaOrRef>,
    ctx: &NamingContext,
) -> Result<TypeHints, TransformError> {
    HintResolver::new(resolver, schemas, Mode::Raw).resolve(schema, ctx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Typed,
    Raw,
}

struct HintResolver<'r, 'a> {
    resolver: &'r RefResolver<'a>,
    schemas: &'r SchemaMap<'a>,
    mode: Mode,
    /// Referenced names being expanded, to stop arrays of themselves.
    visiting: Vec<String>,
}

impl<'r, 'a> HintResolver<'r, 'a> {
    fn new(resolver: &'r RefResolver<'a>, schemas: &'r SchemaMap<'a>, mode: Mode) -> Self {
        Self {
            resolver,
            schemas,
            mode,
            visiting: Vec::new(),
        }
    }

    fn resolve(
        &mut self,
        schema: Option<&SchemaOrRef>,
        ctx: &NamingContext,
    ) -> Result<TypeHints, TransformError> {
        match schema {
            None => Ok(TypeHints::single(TypeToken::Mixed)),
            Some(SchemaOrRef::Ref { ref_path }) => self.reference(ref_path),
            // An annotated reference stands for the schema it wraps.
            Some(SchemaOrRef::Schema(inline)) => match inline.wrapped_reference() {
                Some(wrapped) => {
                    let mut hints = self.reference(wrapped)?;
                    if inline.nullable == Some(true) {
                        hints.push(TypeToken::Null);
                    }
                    Ok(hints)
                }
                None => self.schema(inline, &ctx.derived_name()),
            },
        }
    }

    fn reference(&mut self, reference: &str) -> Result<TypeHints, TransformError> {
        let (terminal, target) = self.resolver.resolve_schema_target(reference)?;
        let name = self.schemas.reference_name(&terminal)?;
        if self.visiting.contains(&name) {
            log::warn!("{name} contains itself through an array or union; typed as mixed");
            return Ok(TypeHints::single(TypeToken::Mixed));
        }
        self.visiting.push(name.clone());
        let hints = self.schema(target, &name);
        self.visiting.pop();
        hints
    }

    /// Hints of a resolved schema whose class, if any, is called `name`.
    fn schema(&mut self, schema: &Schema, name: &str) -> Result<TypeHints, TransformError> {
        let mut hints = TypeHints::new();
        let kind = classify(schema);

        match kind {
            SchemaKind::EnumOfStrings | SchemaKind::EnumOfIntegers | SchemaKind::EnumOfMixedScalars => {
                match self.mode {
                    Mode::Typed => hints.push(TypeToken::Class(name.to_string())),
                    Mode::Raw => hints.extend(literal_kinds(schema)),
                }
                if admits_null(schema) {
                    hints.push(TypeToken::Null);
                }
                return Ok(hints);
            }
            SchemaKind::Object if schema.schema_type.is_none() => {
                hints.push(self.object_token(name));
            }
            SchemaKind::Array if schema.schema_type.is_none() => {
                hints.push(self.array_token(schema, name)?);
            }
            SchemaKind::Object | SchemaKind::Array | SchemaKind::Primitive => {}
        }

        for (keyword, members) in [("oneOf", &schema.one_of), ("anyOf", &schema.any_of)] {
            for (i, member) in members.iter().enumerate() {
                let ctx = NamingContext::new(name, format!("{keyword}{}", i + 1));
                hints.extend(self.resolve(Some(member), &ctx)?);
            }
        }

        for tag in schema.types() {
            let token = match tag {
                SchemaType::Object => self.object_token(name),
                SchemaType::Array => self.array_token(schema, name)?,
                SchemaType::Number => TypeToken::Float,
                SchemaType::Integer => TypeToken::Int,
                SchemaType::String => TypeToken::String,
                SchemaType::Boolean => TypeToken::Bool,
                SchemaType::Null => TypeToken::Null,
            };
            hints.push(token);
        }

        if schema.nullable == Some(true) {
            hints.push(TypeToken::Null);
        }
        if hints.is_empty() || hints.tokens() == [TypeToken::Null] {
            hints.push(TypeToken::Mixed);
        }
        Ok(hints)
    }

    fn object_token(&self, name: &str) -> TypeToken {
        match self.mode {
            Mode::Typed => TypeToken::Class(name.to_string()),
            Mode::Raw => TypeToken::Untyped,
        }
    }

    fn array_token(&mut self, schema: &Schema, name: &str) -> Result<TypeToken, TransformError> {
        let ctx = NamingContext::new(name, "item");
        let items = self.resolve(schema.items.as_deref(), &ctx)?;
        Ok(TypeToken::Array(items))
    }
}

fn admits_null(schema: &Schema) -> bool {
    schema.has_type(SchemaType::Null)
        || schema.nullable == Some(true)
        || schema.enum_values.iter().any(|v| v.is_null())
}

/// Literal kinds of an enum in first-appearance order.
fn literal_kinds(schema: &Schema) -> TypeHints {
    scalar_enum_literals(&schema.enum_values)
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(_) => TypeToken::String,
            serde_json::Value::Bool(_) => TypeToken::Bool,
            v if v.is_i64() => TypeToken::Int,
            _ => TypeToken::Float,
        })
        .collect()
}
