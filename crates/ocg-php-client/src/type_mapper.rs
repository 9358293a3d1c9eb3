use ocg_core::ir::{EnumLiteral, IrFactory};
use ocg_core::type_hint::{TypeHints, TypeToken};

/// Words PHP reserves as class, enum or interface names, lowercase.
const RESERVED_CLASS_NAMES: &[&str] = &[
    "__halt_compiler", "abstract", "and", "array", "as", "bool", "break", "callable", "case",
    "catch", "class", "clone", "const", "continue", "declare", "default", "die", "do", "echo",
    "else", "elseif", "empty", "enddeclare", "endfor", "endforeach", "endif", "endswitch",
    "endwhile", "enum", "eval", "exit", "extends", "false", "final", "finally", "float", "fn",
    "for", "foreach", "function", "global", "goto", "if", "implements", "include",
    "include_once", "instanceof", "insteadof", "int", "interface", "isset", "iterable", "list",
    "match", "mixed", "namespace", "never", "new", "null", "numeric", "object", "or", "parent",
    "print", "private", "protected", "public", "readonly", "require", "require_once",
    "resource", "return", "self", "static", "string", "switch", "throw", "trait", "true", "try",
    "unset", "use", "var", "void", "while", "xor", "yield",
];

/// PHP class name of a generated class. A reserved word gets its
/// sub-namespace as suffix: `List` → `ListModel`.
pub fn php_class_name(name: &str, sub_namespace: &str) -> String {
    if RESERVED_CLASS_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        format!("{name}{sub_namespace}")
    } else {
        name.to_string()
    }
}

/// Fully qualified name of a generated class: `\Ns\Model\Pet`.
pub fn class_fqcn(namespace: &str, sub_namespace: &str, name: &str) -> String {
    root_fqcn(
        namespace,
        &format!("{sub_namespace}\\{}", php_class_name(name, sub_namespace)),
    )
}

/// Fully qualified name of a class directly under the root namespace.
pub fn root_fqcn(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('\\');
    if namespace.is_empty() {
        format!("\\{name}")
    } else {
        format!("\\{namespace}\\{name}")
    }
}

pub fn model_fqcn(namespace: &str, name: &str) -> String {
    class_fqcn(namespace, "Model", name)
}

/// Native PHP type declaration for a set of hints.
///
/// `mixed` absorbs the whole union; a single type plus `null` becomes `?T`.
pub fn php_type(hints: &TypeHints, namespace: &str) -> String {
    if hints.is_empty() || hints.contains(&TypeToken::Mixed) {
        return "mixed".to_string();
    }

    let mut types: Vec<String> = Vec::new();
    for token in hints.without_null().iter() {
        let php = match token {
            TypeToken::Array(_) | TypeToken::Untyped => "array".to_string(),
            TypeToken::Float => "float".to_string(),
            TypeToken::Int => "int".to_string(),
            TypeToken::String => "string".to_string(),
            TypeToken::Bool => "bool".to_string(),
            TypeToken::Class(name) => model_fqcn(namespace, name),
            TypeToken::Mixed | TypeToken::Null => continue,
        };
        if !types.contains(&php) {
            types.push(php);
        }
    }

    let nullable = hints.contains(&TypeToken::Null);
    match types.as_slice() {
        [] => "mixed".to_string(),
        [single] if nullable => format!("?{single}"),
        [single] => single.clone(),
        _ if nullable => format!("{}|null", types.join("|")),
        _ => types.join("|"),
    }
}

/// Docblock type for a set of hints; arrays carry their element type.
pub fn php_doc_type(hints: &TypeHints, namespace: &str) -> String {
    if hints.is_empty() || hints.contains(&TypeToken::Mixed) {
        return "mixed".to_string();
    }
    let mut types: Vec<String> = Vec::new();
    for token in hints {
        let php = match token {
            TypeToken::Array(items) => format!("list<{}>", php_doc_type(items, namespace)),
            TypeToken::Untyped => "array<string, mixed>".to_string(),
            TypeToken::Float => "float".to_string(),
            TypeToken::Int => "int".to_string(),
            TypeToken::String => "string".to_string(),
            TypeToken::Bool => "bool".to_string(),
            TypeToken::Null => "null".to_string(),
            TypeToken::Class(name) => model_fqcn(namespace, name),
            TypeToken::Mixed => "mixed".to_string(),
        };
        if !types.contains(&php) {
            types.push(php);
        }
    }
    types.join("|")
}

/// Make a native type accept `null`.
pub fn nullable(php: &str) -> String {
    if php == "mixed" || php.starts_with('?') || php.split('|').any(|t| t == "null") {
        php.to_string()
    } else if php.contains('|') {
        format!("{php}|null")
    } else {
        format!("?{php}")
    }
}

/// Expression building the typed value from the decoded JSON in `expr`.
pub fn hydrate(factory: &IrFactory, expr: &str, namespace: &str) -> String {
    match factory {
        IrFactory::Direct => expr.to_string(),
        IrFactory::Object(name) => format!("{}::fromArray({expr})", model_fqcn(namespace, name)),
        IrFactory::Enum(name) => format!("{}::from({expr})", model_fqcn(namespace, name)),
        IrFactory::List(inner) => format!(
            "array_map(static fn ($item) => {}, {expr})",
            hydrate(inner, "$item", namespace)
        ),
    }
}

/// Expression turning the typed value in `expr` back into plain data.
pub fn dehydrate(factory: &IrFactory, expr: &str) -> String {
    match factory {
        IrFactory::Direct => expr.to_string(),
        IrFactory::Object(_) => format!("{expr}->toArray()"),
        IrFactory::Enum(_) => format!("{expr}->value"),
        IrFactory::List(inner) => format!(
            "array_map(static fn ($item) => {}, {expr})",
            dehydrate(inner, "$item")
        ),
    }
}

/// A PHP literal for an enum value.
pub fn php_literal(value: &EnumLiteral) -> String {
    match value {
        EnumLiteral::String(s) => php_string(s),
        EnumLiteral::Int(i) => i.to_string(),
        EnumLiteral::Float(f) => format!("{f:?}"),
        EnumLiteral::Bool(b) => b.to_string(),
    }
}

/// Single-quoted PHP string.
pub fn php_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// PHP type of a literal.
pub fn literal_type(value: &EnumLiteral) -> &'static str {
    match value {
        EnumLiteral::String(_) => "string",
        EnumLiteral::Int(_) => "int",
        EnumLiteral::Float(_) => "float",
        EnumLiteral::Bool(_) => "bool",
    }
}

/// A variable name that is legal in PHP.
pub fn php_variable(camel_case: &str) -> String {
    match camel_case {
        "this" => "thisValue".to_string(),
        _ => camel_case.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "Acme\\Shop";

    fn hints(tokens: Vec<TypeToken>) -> TypeHints {
        tokens.into_iter().collect()
    }

    #[test]
    fn test_primitives() {
        assert_eq!(php_type(&hints(vec![TypeToken::Int]), NS), "int");
        assert_eq!(php_type(&hints(vec![TypeToken::Float]), NS), "float");
        assert_eq!(php_type(&hints(vec![TypeToken::Bool]), NS), "bool");
        assert_eq!(php_type(&hints(vec![TypeToken::Untyped]), NS), "array");
        assert_eq!(php_type(&TypeHints::new(), NS), "mixed");
    }

    #[test]
    fn test_mixed_absorbs_union() {
        let h = hints(vec![TypeToken::String, TypeToken::Mixed, TypeToken::Null]);
        assert_eq!(php_type(&h, NS), "mixed");
        assert_eq!(php_doc_type(&h, NS), "mixed");
    }

    #[test]
    fn test_nullable_single_and_union() {
        let single = hints(vec![TypeToken::String, TypeToken::Null]);
        assert_eq!(php_type(&single, NS), "?string");
        let union = hints(vec![TypeToken::Int, TypeToken::String, TypeToken::Null]);
        assert_eq!(php_type(&union, NS), "int|string|null");
    }

    #[test]
    fn test_classes_are_fully_qualified() {
        let h = hints(vec![TypeToken::Class("Pet".into())]);
        assert_eq!(php_type(&h, NS), "\\Acme\\Shop\\Model\\Pet");
        assert_eq!(php_type(&h, ""), "\\Model\\Pet");
        assert_eq!(class_fqcn("\\Acme\\", "Api", "PetApi"), "\\Acme\\Api\\PetApi");
        assert_eq!(root_fqcn("Acme", "ApiException"), "\\Acme\\ApiException");
    }

    #[test]
    fn test_arrays_collapse_natively_but_not_in_docs() {
        let items = hints(vec![TypeToken::Class("Pet".into())]);
        let h = hints(vec![TypeToken::Array(items), TypeToken::Untyped]);
        assert_eq!(php_type(&h, NS), "array");
        assert_eq!(
            php_doc_type(&h, NS),
            "list<\\Acme\\Shop\\Model\\Pet>|array<string, mixed>"
        );
    }

    #[test]
    fn test_nullable_helper() {
        assert_eq!(nullable("int"), "?int");
        assert_eq!(nullable("?int"), "?int");
        assert_eq!(nullable("int|string"), "int|string|null");
        assert_eq!(nullable("int|null"), "int|null");
        assert_eq!(nullable("mixed"), "mixed");
    }

    #[test]
    fn test_hydrate_nested_lists() {
        let factory = IrFactory::List(Box::new(IrFactory::Object("Pet".into())));
        assert_eq!(
            hydrate(&factory, "$data['pets']", NS),
            "array_map(static fn ($item) => \\Acme\\Shop\\Model\\Pet::fromArray($item), $data['pets'])"
        );
        assert_eq!(
            dehydrate(&factory, "$this->pets"),
            "array_map(static fn ($item) => $item->toArray(), $this->pets)"
        );
        assert_eq!(
            hydrate(&IrFactory::Enum("Mood".into()), "$v", NS),
            "\\Acme\\Shop\\Model\\Mood::from($v)"
        );
        assert_eq!(dehydrate(&IrFactory::Direct, "$this->id"), "$this->id");
    }

    #[test]
    fn test_literals() {
        assert_eq!(php_literal(&EnumLiteral::String("it's".into())), "'it\\'s'");
        assert_eq!(php_literal(&EnumLiteral::Int(-3)), "-3");
        assert_eq!(php_literal(&EnumLiteral::Float(1.5)), "1.5");
        assert_eq!(php_literal(&EnumLiteral::Float(2.0)), "2.0");
        assert_eq!(php_literal(&EnumLiteral::Bool(true)), "true");
        assert_eq!(literal_type(&EnumLiteral::Bool(false)), "bool");
    }

    #[test]
    fn test_reserved_class_names_get_a_suffix() {
        assert_eq!(php_class_name("List", "Model"), "ListModel");
        assert_eq!(php_class_name("Object", "Model"), "ObjectModel");
        assert_eq!(php_class_name("Default", "Response"), "DefaultResponse");
        assert_eq!(php_class_name("Pet", "Model"), "Pet");
        assert_eq!(
            php_type(&hints(vec![TypeToken::Class("List".into())]), NS),
            "\\Acme\\Shop\\Model\\ListModel"
        );
        assert_eq!(
            hydrate(&IrFactory::Object("Object".into()), "$v", NS),
            "\\Acme\\Shop\\Model\\ObjectModel::fromArray($v)"
        );
    }

    #[test]
    fn test_reserved_variable() {
        assert_eq!(php_variable("this"), "thisValue");
        assert_eq!(php_variable("petId"), "petId");
    }
}
