use minijinja::context;
use ocg_core::GeneratorError;
use ocg_core::ir::{IrAdditionalProperties, IrEntity, IrFactory, IrProperty};
use serde::Serialize;

use super::{render, sub_namespace};
use crate::type_mapper::{
    dehydrate, hydrate, nullable, php_class_name, php_doc_type, php_string, php_type, php_variable,
};

#[derive(Debug, Serialize)]
struct PropertyCtx {
    key: String,
    variable: String,
    native_type: String,
    doc_type: String,
    description: Option<String>,
    required: bool,
    hydrate: String,
    dehydrate: String,
}

#[derive(Debug, Serialize)]
struct AdditionalCtx {
    doc_type: String,
    hydrate: Option<String>,
    dehydrate: Option<String>,
}

/// Emit `src/Model/<Name>.php` for an object entity.
pub fn emit_model(entity: &IrEntity, namespace: &str) -> Result<String, GeneratorError> {
    let known: Vec<String> = entity
        .properties
        .iter()
        .map(|p| format!("{} => true", php_string(&p.original_name)))
        .collect();

    let mut properties: Vec<PropertyCtx> = entity
        .properties
        .iter()
        .map(|p| property_ctx(p, namespace))
        .collect();
    // Optional constructor parameters must follow required ones.
    properties.sort_by_key(|p| !p.required);

    let additional = entity
        .additional_properties
        .as_ref()
        .map(|a| additional_ctx(a, namespace));

    render(
        "model.php.j2",
        context! {
            namespace => sub_namespace(namespace, "Model"),
            name => php_class_name(&entity.name, "Model"),
            description => entity.description.clone(),
            deprecated => entity.deprecated,
            properties => properties,
            additional => additional,
            known => format!("[{}]", known.join(", ")),
        },
    )
}

fn property_ctx(property: &IrProperty, namespace: &str) -> PropertyCtx {
    let key = php_string(&property.original_name);
    let variable = php_variable(&property.name.camel_case);
    let nullable_value = property.hints.is_nullable();

    let mut native_type = php_type(&property.hints, namespace);
    let mut doc_type = php_doc_type(&property.hints, namespace);
    if !property.required && !nullable_value {
        native_type = nullable(&native_type);
        doc_type = format!("{doc_type}|null");
    }

    let input = format!("$data[{key}]");
    let hydrate = match &property.factory {
        IrFactory::Direct if property.required => input,
        IrFactory::Direct => format!("{input} ?? null"),
        factory if property.required && !nullable_value => hydrate(factory, &input, namespace),
        factory => format!(
            "isset({input}) ? {} : null",
            hydrate(factory, &input, namespace)
        ),
    };

    let value = format!("$this->{variable}");
    // Optional values are only serialized when set, so only a nullable
    // type needs the null check.
    let dehydrate = match &property.factory {
        IrFactory::Direct => value,
        factory if !nullable_value => dehydrate(factory, &value),
        factory => format!("{value} === null ? null : {}", dehydrate(factory, &value)),
    };

    let mut description = property.description.clone();
    if property.read_only {
        description = Some(match description {
            Some(text) => format!("{text} (read-only)"),
            None => "Read-only.".to_string(),
        });
    }

    PropertyCtx {
        key,
        variable,
        native_type,
        doc_type,
        description,
        required: property.required,
        hydrate,
        dehydrate,
    }
}

fn additional_ctx(additional: &IrAdditionalProperties, namespace: &str) -> AdditionalCtx {
    let (hydrate, dehydrate) = match &additional.factory {
        IrFactory::Direct => (None, None),
        factory => (
            Some(hydrate(factory, "$value", namespace)),
            Some(dehydrate(factory, "$value")),
        ),
    };
    AdditionalCtx {
        doc_type: format!("array<string, {}>", php_doc_type(&additional.hints, namespace)),
        hydrate,
        dehydrate,
    }
}
