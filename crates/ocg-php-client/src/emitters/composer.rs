use heck::ToKebabCase;
use ocg_core::GeneratorError;
use ocg_core::config::PhpConfig;
use ocg_core::ir::IrSpec;
use serde_json::{Map, json};

/// Composer package name: configured, or `vendor/<slugified title>`.
pub fn package_name(ir: &IrSpec, config: &PhpConfig) -> String {
    match &config.package_name {
        Some(name) => name.clone(),
        None => {
            let slug = ir.info.title.to_kebab_case();
            if slug.is_empty() {
                "vendor/api-client".to_string()
            } else {
                format!("vendor/{slug}")
            }
        }
    }
}

/// Emit `composer.json` with a PSR-4 autoload entry for the root namespace.
pub fn emit_composer_json(ir: &IrSpec, config: &PhpConfig) -> Result<String, GeneratorError> {
    let namespace = format!("{}\\", ir.namespace.trim_matches('\\'));
    let description = ir
        .info
        .description
        .clone()
        .unwrap_or_else(|| format!("{} API client", ir.info.title));

    let mut psr4 = Map::new();
    psr4.insert(namespace, json!("src/"));

    let mut manifest = json!({
        "name": package_name(ir, config),
        "description": description,
        "type": "library",
        "require": {
            "php": format!(">={}", config.php_version),
            "ext-json": "*",
            "psr/http-client": "^1.0",
            "psr/http-factory": "^1.0",
            "psr/http-message": "^1.1 || ^2.0"
        },
        "autoload": {
            "psr-4": psr4
        }
    });
    if let (Some(license), Some(fields)) = (&ir.info.license, manifest.as_object_mut()) {
        fields.insert("license".to_string(), json!(license));
    }

    let mut content = serde_json::to_string_pretty(&manifest)
        .map_err(|e| GeneratorError::Other(format!("composer.json: {e}")))?;
    content.push('\n');
    Ok(content)
}
