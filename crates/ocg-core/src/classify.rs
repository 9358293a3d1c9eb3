use serde::Serialize;
use serde_json::Value;

use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};

/// What a schema turns into downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    Object,
    EnumOfStrings,
    EnumOfIntegers,
    EnumOfMixedScalars,
    Array,
    Primitive,
}

impl SchemaKind {
    /// Object and enum schemas become classes; arrays and primitives only
    /// anchor the recursion that names their children.
    pub fn is_emitted(&self) -> bool {
        matches!(
            self,
            SchemaKind::Object
                | SchemaKind::EnumOfStrings
                | SchemaKind::EnumOfIntegers
                | SchemaKind::EnumOfMixedScalars
        )
    }

    pub fn is_enum(&self) -> bool {
        matches!(
            self,
            SchemaKind::EnumOfStrings | SchemaKind::EnumOfIntegers | SchemaKind::EnumOfMixedScalars
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::EnumOfStrings => "enum-of-strings",
            SchemaKind::EnumOfIntegers => "enum-of-integers",
            SchemaKind::EnumOfMixedScalars => "enum-of-mixed-scalars",
            SchemaKind::Array => "array",
            SchemaKind::Primitive => "primitive",
        }
    }
}

/// Classify a schema without following references.
///
/// Enum literals take precedence over `type`. A schema without `type` is an
/// implicit object when it has properties, an `additionalProperties` schema
/// or object `allOf` members, and an implicit array when it has `items`.
/// A schema that only annotates one reference is not an object of its own;
/// it stands for the schema it wraps.
pub fn classify(schema: &Schema) -> SchemaKind {
    if let Some(kind) = classify_enum(&schema.enum_values) {
        return kind;
    }
    if schema.has_type(SchemaType::Object) {
        return SchemaKind::Object;
    }
    if schema.has_type(SchemaType::Array) {
        return SchemaKind::Array;
    }
    if schema.schema_type.is_none() {
        if !schema.properties.is_empty()
            || schema.additional_properties_schema().is_some()
            || composes_object(schema)
        {
            return SchemaKind::Object;
        }
        if schema.items.is_some() {
            return SchemaKind::Array;
        }
    }
    SchemaKind::Primitive
}

/// `allOf` whose members are references or inline objects, at least one of
/// them more than an annotation.
fn composes_object(schema: &Schema) -> bool {
    if schema.all_of.is_empty() || schema.wrapped_reference().is_some() {
        return false;
    }
    let mut shaped = false;
    for member in &schema.all_of {
        match member {
            SchemaOrRef::Ref { .. } => shaped = true,
            SchemaOrRef::Schema(inline) if inline.is_annotation_only() => {}
            SchemaOrRef::Schema(inline) if classify(inline) == SchemaKind::Object => shaped = true,
            SchemaOrRef::Schema(_) => return false,
        }
    }
    shaped
}

/// Non-null enum literals, or `None` when the enum is empty or carries
/// structured values.
pub fn scalar_enum_literals(values: &[Value]) -> Option<Vec<&Value>> {
    let literals: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    if literals.is_empty() || literals.iter().any(|v| v.is_object() || v.is_array()) {
        return None;
    }
    Some(literals)
}

fn classify_enum(values: &[Value]) -> Option<SchemaKind> {
    let literals = scalar_enum_literals(values)?;
    if literals.iter().all(|v| v.is_string()) {
        Some(SchemaKind::EnumOfStrings)
    } else if literals.iter().all(|v| is_integer(v)) {
        Some(SchemaKind::EnumOfIntegers)
    } else {
        Some(SchemaKind::EnumOfMixedScalars)
    }
}

/// Integers PHP and the IR can hold; larger literals count as floats.
fn is_integer(value: &Value) -> bool {
    value.is_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn enums_take_precedence_over_type() {
        assert_eq!(
            classify(&schema(r#"{"type": "string", "enum": ["a", "b"]}"#)),
            SchemaKind::EnumOfStrings
        );
        assert_eq!(
            classify(&schema(r#"{"type": "integer", "enum": [1, 2, 3]}"#)),
            SchemaKind::EnumOfIntegers
        );
        assert_eq!(
            classify(&schema(r#"{"type": "object", "enum": ["a"]}"#)),
            SchemaKind::EnumOfStrings
        );
    }

    #[test]
    fn mixed_literals_are_mixed() {
        assert_eq!(
            classify(&schema(r#"{"enum": [1, 2, "three", "four"]}"#)),
            SchemaKind::EnumOfMixedScalars
        );
        assert_eq!(
            classify(&schema(r#"{"enum": [1.5, 2.5]}"#)),
            SchemaKind::EnumOfMixedScalars
        );
        assert_eq!(
            classify(&schema(r#"{"enum": [true, false]}"#)),
            SchemaKind::EnumOfMixedScalars
        );
    }

    #[test]
    fn null_literals_are_ignored() {
        assert_eq!(
            classify(&schema(r#"{"type": ["string", "null"], "enum": ["a", null]}"#)),
            SchemaKind::EnumOfStrings
        );
        assert_eq!(
            classify(&schema(r#"{"type": "string", "enum": [null]}"#)),
            SchemaKind::Primitive
        );
    }

    #[test]
    fn structured_literals_are_not_enums() {
        assert_eq!(
            classify(&schema(r#"{"type": "object", "enum": [{"a": 1}]}"#)),
            SchemaKind::Object
        );
    }

    #[test]
    fn type_tags_and_implicit_shapes() {
        assert_eq!(classify(&schema(r#"{"type": "object"}"#)), SchemaKind::Object);
        assert_eq!(
            classify(&schema(r#"{"type": ["object", "null"]}"#)),
            SchemaKind::Object
        );
        assert_eq!(
            classify(&schema(r#"{"type": "array", "items": {"type": "string"}}"#)),
            SchemaKind::Array
        );
        assert_eq!(
            classify(&schema(r#"{"properties": {"a": {"type": "string"}}}"#)),
            SchemaKind::Object
        );
        assert_eq!(
            classify(&schema(r#"{"items": {"type": "string"}}"#)),
            SchemaKind::Array
        );
        assert_eq!(classify(&schema(r#"{"type": "string"}"#)), SchemaKind::Primitive);
        assert_eq!(classify(&schema("{}")), SchemaKind::Primitive);
    }

    #[test]
    fn integers_beyond_i64_are_not_integer_enums() {
        assert_eq!(
            classify(&schema(r#"{"enum": [1, 18446744073709551615]}"#)),
            SchemaKind::EnumOfMixedScalars
        );
        assert_eq!(
            classify(&schema(r#"{"enum": [9223372036854775807]}"#)),
            SchemaKind::EnumOfIntegers
        );
    }

    #[test]
    fn annotated_reference_is_not_an_object() {
        assert_eq!(
            classify(&schema(
                r##"{"description": "status", "allOf": [{"$ref": "#/components/schemas/Status"}]}"##
            )),
            SchemaKind::Primitive
        );
        assert_eq!(
            classify(&schema(
                r##"{"allOf": [{"$ref": "#/components/schemas/Base"}, {"type": "object", "properties": {"x": {"type": "string"}}}]}"##
            )),
            SchemaKind::Object
        );
        assert_eq!(
            classify(&schema(
                r##"{"allOf": [{"$ref": "#/components/schemas/A"}, {"$ref": "#/components/schemas/B"}]}"##
            )),
            SchemaKind::Object
        );
        assert_eq!(
            classify(&schema(r#"{"allOf": [{"type": "string"}, {"description": "d"}]}"#)),
            SchemaKind::Primitive
        );
        assert_eq!(
            classify(&schema(r#"{"allOf": [{"description": "d"}]}"#)),
            SchemaKind::Primitive
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let s = schema(r#"{"enum": [1, "a", true]}"#);
        assert_eq!(classify(&s), classify(&s));
    }

    #[test]
    fn only_objects_and_enums_are_emitted() {
        assert!(SchemaKind::Object.is_emitted());
        assert!(SchemaKind::EnumOfMixedScalars.is_emitted());
        assert!(!SchemaKind::Array.is_emitted());
        assert!(!SchemaKind::Primitive.is_emitted());
    }
}
