pub mod apis;
pub mod composer;
pub mod configuration;
pub mod enums;
pub mod models;
pub mod responses;

use minijinja::{Environment, Value};
use ocg_core::GeneratorError;

use crate::type_mapper::php_class_name;

/// Templates embedded at build time, by name.
const TEMPLATES: [(&str, &str); 8] = [
    ("model.php.j2", include_str!("../../templates/model.php.j2")),
    ("backed_enum.php.j2", include_str!("../../templates/backed_enum.php.j2")),
    ("scalar_enum.php.j2", include_str!("../../templates/scalar_enum.php.j2")),
    ("response.php.j2", include_str!("../../templates/response.php.j2")),
    ("api.php.j2", include_str!("../../templates/api.php.j2")),
    ("abstract_api.php.j2", include_str!("../../templates/abstract_api.php.j2")),
    ("configuration.php.j2", include_str!("../../templates/configuration.php.j2")),
    ("api_exception.php.j2", include_str!("../../templates/api_exception.php.j2")),
];

/// Fold text onto one docblock line and escape `*/` sequences that would
/// prematurely close it.
fn escape_doc(value: String) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}

fn environment() -> Result<Environment<'static>, GeneratorError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("escape_doc", escape_doc);
    for (name, source) in TEMPLATES {
        env.add_template(name, source)
            .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))?;
    }
    Ok(env)
}

/// Render one embedded template.
pub(crate) fn render(name: &str, ctx: Value) -> Result<String, GeneratorError> {
    let env = environment()?;
    let tmpl = env
        .get_template(name)
        .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))?;
    tmpl.render(ctx)
        .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))
}

/// PHP namespace of a generated sub-package, without a leading separator.
pub(crate) fn sub_namespace(root: &str, sub: &str) -> String {
    let root = root.trim_matches('\\');
    if root.is_empty() {
        sub.to_string()
    } else {
        format!("{root}\\{sub}")
    }
}

/// Path of a class file under `src/`.
pub(crate) fn class_path(sub: &str, name: &str) -> String {
    format!("src/{sub}/{}.php", php_class_name(name, sub))
}
