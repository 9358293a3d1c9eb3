use minijinja::context;
use ocg_core::GeneratorError;
use ocg_core::classify::SchemaKind;
use ocg_core::ir::{IrEntity, IrEnumCase};
use serde::Serialize;

use super::{render, sub_namespace};
use crate::type_mapper::{literal_type, php_class_name, php_literal, php_string};

#[derive(Debug, Serialize)]
struct CaseCtx {
    label: String,
    /// The label as a PHP string, for lookup tables.
    key: String,
    literal: String,
}

/// Case names a backed enum cannot declare.
const BACKED_RESERVED: &[&str] = &["class"];

/// Case names a mixed-enum class cannot declare: its case accessors are
/// static methods, which must not clash with the class's own methods.
const SCALAR_RESERVED: &[&str] = &["class", "from", "tryfrom", "cases", "jsonserialize", "instance"];

/// Cases with PHP-legal names. A reserved name gets a `Case` suffix; names
/// are kept distinct ignoring case, as PHP method names are. The lookup key
/// stays the case label.
fn case_contexts(cases: &[IrEnumCase], reserved: &[&str]) -> Vec<CaseCtx> {
    let mut taken: Vec<String> = Vec::with_capacity(cases.len());
    cases
        .iter()
        .map(|case| {
            let mut base = case.label.clone();
            if reserved.contains(&base.to_ascii_lowercase().as_str()) {
                base.push_str("Case");
            }
            let mut label = base.clone();
            let mut suffix = 2;
            while taken.contains(&label.to_ascii_lowercase()) {
                label = format!("{base}{suffix}");
                suffix += 1;
            }
            taken.push(label.to_ascii_lowercase());
            CaseCtx {
                label,
                key: php_string(&case.label),
                literal: php_literal(&case.value),
            }
        })
        .collect()
}

/// Emit `src/Model/<Name>.php` for an enum entity.
///
/// String and integer enums become backed enums. Mixed scalar enums have no
/// native counterpart and become a final class whose instances are cached per
/// case, so equal literals yield identical objects.
pub fn emit_enum(entity: &IrEntity, namespace: &str) -> Result<String, GeneratorError> {
    let cases = entity.enum_cases.cases();
    let namespace = sub_namespace(namespace, "Model");
    let name = php_class_name(&entity.name, "Model");

    let backing = match entity.kind {
        SchemaKind::EnumOfStrings => "string",
        SchemaKind::EnumOfIntegers => "int",
        SchemaKind::EnumOfMixedScalars => {
            return render(
                "scalar_enum.php.j2",
                context! {
                    namespace => namespace,
                    name => name,
                    description => entity.description.clone(),
                    deprecated => entity.deprecated,
                    value_type => value_type(entity),
                    cases => case_contexts(cases, SCALAR_RESERVED),
                },
            );
        }
        SchemaKind::Object | SchemaKind::Array | SchemaKind::Primitive => {
            return Err(GeneratorError::Other(format!(
                "{} is a {} schema, not an enum",
                entity.name,
                entity.kind.as_str()
            )));
        }
    };

    render(
        "backed_enum.php.j2",
        context! {
            namespace => namespace,
            name => name,
            description => entity.description.clone(),
            deprecated => entity.deprecated,
            backing => backing,
            cases => case_contexts(cases, BACKED_RESERVED),
        },
    )
}

/// Union of the literal types in first-appearance order.
fn value_type(entity: &IrEntity) -> String {
    let mut types: Vec<&str> = Vec::new();
    for case in entity.enum_cases.cases() {
        let ty = literal_type(&case.value);
        if !types.contains(&ty) {
            types.push(ty);
        }
    }
    if types.is_empty() {
        return "string".to_string();
    }
    types.join("|")
}
