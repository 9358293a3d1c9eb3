use std::collections::HashMap;
use std::fmt;

use heck::ToPascalCase;
use serde_json::Value;

use crate::classify::{SchemaKind, scalar_enum_literals};
use crate::type_hint::TypeHints;

use super::types::NormalizedName;

/// A generated class: an object model or an enum.
#[derive(Debug, Clone)]
pub struct IrEntity {
    pub name: String,
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub properties: Vec<IrProperty>,
    pub additional_properties: Option<IrAdditionalProperties>,
    pub enum_cases: EnumCaseTable,
    pub deprecated: bool,
}

impl IrEntity {
    pub fn is_enum(&self) -> bool {
        self.kind.is_enum()
    }
}

/// A property of an object model.
#[derive(Debug, Clone)]
pub struct IrProperty {
    pub name: NormalizedName,
    pub original_name: String,
    /// Type of the model property.
    pub hints: TypeHints,
    /// Type of the decoded JSON value the factory receives.
    pub raw_hints: TypeHints,
    pub factory: IrFactory,
    pub required: bool,
    pub description: Option<String>,
    pub read_only: bool,
    pub write_only: bool,
}

/// Values of an `additionalProperties` schema.
#[derive(Debug, Clone)]
pub struct IrAdditionalProperties {
    pub hints: TypeHints,
    pub raw_hints: TypeHints,
    pub factory: IrFactory,
}

/// How a typed value is built from its decoded JSON form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrFactory {
    /// Used as decoded.
    Direct,
    /// An object model built from an array.
    Object(String),
    /// An enum looked up by its literal.
    Enum(String),
    /// A list whose elements are built with the inner factory.
    List(Box<IrFactory>),
}

impl IrFactory {
    pub fn is_direct(&self) -> bool {
        matches!(self, IrFactory::Direct)
    }
}

/// A literal enum value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumLiteral {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl EnumLiteral {
    /// Convert a JSON scalar; `None` for null and structured values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(EnumLiteral::String(s.clone())),
            Value::Bool(b) => Some(EnumLiteral::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(EnumLiteral::Int(i)),
                None => n.as_f64().map(EnumLiteral::Float),
            },
            _ => None,
        }
    }

    /// Key distinguishing literals of different kinds with the same text.
    fn key(&self) -> String {
        match self {
            EnumLiteral::String(s) => format!("s:{s}"),
            EnumLiteral::Int(i) => format!("i:{i}"),
            EnumLiteral::Float(f) => format!("f:{f}"),
            EnumLiteral::Bool(b) => format!("b:{b}"),
        }
    }

    /// A case label for this literal. Strings are PascalCased; numbers become
    /// `Value<n>` with `-` spelled `Minus` and `.` as `_`.
    pub fn label(&self) -> String {
        match self {
            EnumLiteral::String(s) => {
                let label = s.to_pascal_case();
                if label.is_empty() {
                    "Empty".to_string()
                } else if label.starts_with(|c: char| c.is_ascii_digit()) {
                    format!("Value{label}")
                } else {
                    label
                }
            }
            EnumLiteral::Int(i) => number_label(&i.to_string()),
            EnumLiteral::Float(f) => number_label(&f.to_string()),
            EnumLiteral::Bool(true) => "True".to_string(),
            EnumLiteral::Bool(false) => "False".to_string(),
        }
    }
}

fn number_label(text: &str) -> String {
    format!("Value{}", text.replace('-', "Minus").replace('.', "_"))
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::String(s) => write!(f, "{s:?}"),
            EnumLiteral::Int(i) => write!(f, "{i}"),
            EnumLiteral::Float(v) => write!(f, "{v:?}"),
            EnumLiteral::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One case of an enum class.
#[derive(Debug, Clone, PartialEq)]
pub struct IrEnumCase {
    pub label: String,
    pub value: EnumLiteral,
}

/// The cases of one enum, with a lookup from literal to case.
///
/// Built once per entity. Emitters that need identity-preserving factories
/// (the same literal always yields the same instance) key their instance
/// cache by the case label this table assigns.
#[derive(Debug, Clone, Default)]
pub struct EnumCaseTable {
    cases: Vec<IrEnumCase>,
    by_literal: HashMap<String, usize>,
}

impl EnumCaseTable {
    /// Build the table from raw `enum` values. Nulls and structured values
    /// are skipped; repeated literals are kept once; labels that collide get a
    /// numeric suffix.
    pub fn from_values(values: &[Value]) -> Self {
        let mut table = EnumCaseTable::default();
        let literals = scalar_enum_literals(values).unwrap_or_default();
        for literal in literals.into_iter().filter_map(EnumLiteral::from_json) {
            table.insert(literal);
        }
        table
    }

    fn insert(&mut self, value: EnumLiteral) {
        let key = value.key();
        if self.by_literal.contains_key(&key) {
            return;
        }
        let base = value.label();
        let mut label = base.clone();
        let mut suffix = 2;
        while self.cases.iter().any(|c| c.label == label) {
            label = format!("{base}{suffix}");
            suffix += 1;
        }
        self.by_literal.insert(key, self.cases.len());
        self.cases.push(IrEnumCase { label, value });
    }

    pub fn lookup(&self, value: &EnumLiteral) -> Option<&IrEnumCase> {
        self.by_literal.get(&value.key()).map(|&i| &self.cases[i])
    }

    pub fn cases(&self) -> &[IrEnumCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
