use minijinja::context;
use ocg_core::GeneratorError;
use ocg_core::ir::IrSpec;

use super::render;
use crate::type_mapper::php_string;

/// Emit `src/Configuration.php`: host, default headers and credentials.
/// The first server is the default host.
pub fn emit_configuration(ir: &IrSpec) -> Result<String, GeneratorError> {
    let servers: Vec<String> = ir.servers.iter().map(|s| php_string(&s.url)).collect();
    let default_host = servers.first().cloned().unwrap_or_else(|| php_string(""));

    render(
        "configuration.php.j2",
        context! {
            namespace => root_namespace(&ir.namespace),
            title => ir.info.title.clone(),
            version => php_string(&ir.info.version),
            default_host => default_host,
            servers => servers,
        },
    )
}

/// Emit `src/AbstractApi.php`, the base class of every API class.
pub fn emit_abstract_api(ir: &IrSpec) -> Result<String, GeneratorError> {
    render(
        "abstract_api.php.j2",
        context! { namespace => root_namespace(&ir.namespace) },
    )
}

/// Emit `src/ApiException.php`.
pub fn emit_api_exception(ir: &IrSpec) -> Result<String, GeneratorError> {
    render(
        "api_exception.php.j2",
        context! { namespace => root_namespace(&ir.namespace) },
    )
}

fn root_namespace(namespace: &str) -> String {
    namespace.trim_matches('\\').to_string()
}
