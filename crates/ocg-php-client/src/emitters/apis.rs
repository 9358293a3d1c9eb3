use minijinja::context;
use ocg_core::GeneratorError;
use ocg_core::ir::{IrApi, IrOperation, IrParameterLocation, IrSpec};
use ocg_core::naming::method_identifier;
use ocg_core::type_hint::TypeHints;
use serde::Serialize;

use super::{render, sub_namespace};
use crate::type_mapper::{
    class_fqcn, nullable, php_doc_type, php_string, php_type, php_variable, root_fqcn,
};

const REQUEST_BODY_VARIABLE: &str = "requestBody";

#[derive(Debug, Serialize)]
struct OperationCtx {
    name: String,
    signature: String,
    return_type: String,
    doc: Vec<String>,
    http_method: String,
    path: String,
    groups: Vec<GroupCtx>,
    /// Content type of the request body, as a PHP expression.
    body: Option<String>,
    arms: Vec<ArmCtx>,
}

/// One `send()` argument collecting parameters of a location.
#[derive(Debug, Serialize)]
struct GroupCtx {
    name: &'static str,
    entries: String,
}

/// One arm of the status `match`.
#[derive(Debug, Serialize)]
struct ArmCtx {
    condition: String,
    result: String,
}

/// A method argument before rendering.
struct Argument {
    variable: String,
    native_type: String,
    doc_type: String,
    description: Option<String>,
    required: bool,
}

/// Emit `src/Api/<Tag>Api.php` with one method per operation of the tag.
pub fn emit_api(api: &IrApi, ir: &IrSpec) -> Result<String, GeneratorError> {
    let mut operations = Vec::with_capacity(api.operations.len());
    for &index in &api.operations {
        let op = ir.operations.get(index).ok_or_else(|| {
            GeneratorError::Other(format!("{} refers to missing operation {index}", api.class_name))
        })?;
        operations.push(operation_ctx(op, &ir.namespace));
    }

    render(
        "api.php.j2",
        context! {
            namespace => sub_namespace(&ir.namespace, "Api"),
            root_namespace => ir.namespace.trim_matches('\\').to_string(),
            class_name => api.class_name.clone(),
            tag => api.tag.original.clone(),
            description => api.description.clone(),
            operations => operations,
        },
    )
}

/// Methods of `AbstractApi` an operation method must not redeclare.
const INHERITED_METHODS: [&str; 4] = ["__construct", "send", "decode", "scalar"];

/// PHP method name: operation ids that are not identifiers are camel-cased,
/// and a name taken by `AbstractApi` gets an `Operation` suffix.
pub fn php_method_name(name: &str) -> String {
    let identifier = method_identifier(name);
    if INHERITED_METHODS
        .iter()
        .any(|inherited| inherited.eq_ignore_ascii_case(&identifier))
    {
        format!("{identifier}Operation")
    } else {
        identifier
    }
}

fn argument(hints: &TypeHints, required: bool, namespace: &str) -> (String, String) {
    let native = php_type(hints, namespace);
    let doc = php_doc_type(hints, namespace);
    if required || hints.is_nullable() {
        (native, doc)
    } else {
        (nullable(&native), format!("{doc}|null"))
    }
}

fn operation_ctx(op: &IrOperation, namespace: &str) -> OperationCtx {
    let mut arguments = Vec::new();
    for p in &op.parameters {
        let (native_type, doc_type) = argument(&p.hints, p.required, namespace);
        arguments.push(Argument {
            variable: php_variable(&p.name.camel_case),
            native_type,
            doc_type,
            description: p.description.clone(),
            required: p.required,
        });
    }
    if let Some(body) = &op.request_body {
        let (native_type, doc_type) = argument(&body.hints, body.required, namespace);
        arguments.push(Argument {
            variable: REQUEST_BODY_VARIABLE.to_string(),
            native_type,
            doc_type,
            description: body.description.clone(),
            required: body.required,
        });
    }
    // Optional arguments must follow required ones.
    arguments.sort_by_key(|a| !a.required);

    let signature = arguments
        .iter()
        .map(|a| {
            let default = if a.required { "" } else { " = null" };
            format!("{} ${}{default}", a.native_type, a.variable)
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut groups = Vec::new();
    for (name, location) in [
        ("pathParams", IrParameterLocation::Path),
        ("query", IrParameterLocation::Query),
        ("headers", IrParameterLocation::Header),
        ("cookies", IrParameterLocation::Cookie),
    ] {
        let entries: Vec<String> = op
            .parameters_in(location)
            .map(|p| {
                format!(
                    "{} => ${}",
                    php_string(&p.original_name),
                    php_variable(&p.name.camel_case)
                )
            })
            .collect();
        if !entries.is_empty() {
            groups.push(GroupCtx {
                name,
                entries: entries.join(", "),
            });
        }
    }

    let body = op.request_body.as_ref().map(|b| {
        let content_type = php_string(&b.content_type);
        if b.required {
            content_type
        } else {
            format!("${REQUEST_BODY_VARIABLE} === null ? null : {content_type}")
        }
    });

    let mut classes: Vec<String> = Vec::new();
    for response in &op.responses {
        let class = class_fqcn(namespace, "Response", &response.class_name);
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    let (return_type, arms) = if classes.is_empty() {
        (
            "\\Psr\\Http\\Message\\ResponseInterface".to_string(),
            Vec::new(),
        )
    } else {
        (classes.join("|"), status_arms(op, namespace))
    };
    let has_default = op.responses.iter().any(|r| r.status == "default");

    let mut doc = Vec::new();
    if let Some(summary) = &op.summary {
        doc.push(summary.clone());
    }
    if let Some(description) = &op.description {
        if !doc.is_empty() {
            doc.push(String::new());
        }
        doc.push(description.clone());
    }
    if !doc.is_empty() {
        doc.push(String::new());
    }
    doc.push(format!("{} {}", op.http_method.as_str(), op.path));
    doc.push(String::new());
    for a in &arguments {
        let mut line = format!("@param {} ${}", a.doc_type, a.variable);
        if let Some(description) = &a.description {
            line.push(' ');
            line.push_str(description);
        }
        doc.push(line);
    }
    doc.push(format!("@return {return_type}"));
    if !classes.is_empty() && !has_default {
        doc.push(format!(
            "@throws {} when the status code is not documented",
            root_fqcn(namespace, "ApiException")
        ));
    }
    doc.push("@throws \\Psr\\Http\\Client\\ClientExceptionInterface".to_string());
    if op.deprecated {
        doc.push("@deprecated".to_string());
    }

    OperationCtx {
        name: php_method_name(&op.method_name),
        signature,
        return_type,
        doc,
        http_method: php_string(op.http_method.as_str()),
        path: php_string(&op.path),
        groups,
        body,
        arms,
    }
}

/// Exact statuses first, then `4XX`-style ranges, then `default`. Without a
/// `default` response an undocumented status raises `ApiException`.
fn status_arms(op: &IrOperation, namespace: &str) -> Vec<ArmCtx> {
    let result = |class_name: &str| {
        format!(
            "{}::fromDecoded($httpStatus, $httpPayload, $httpHeaders)",
            class_fqcn(namespace, "Response", class_name)
        )
    };

    let mut exact = Vec::new();
    let mut ranges = Vec::new();
    let mut default = None;
    for response in &op.responses {
        let status = response.status.as_str();
        if status.eq_ignore_ascii_case("default") {
            default = Some(result(&response.class_name));
        } else if let Ok(code) = status.parse::<u16>() {
            exact.push(ArmCtx {
                condition: format!("$httpStatus === {code}"),
                result: result(&response.class_name),
            });
        } else if let Some(class) = status_class(status) {
            ranges.push(ArmCtx {
                condition: format!("intdiv($httpStatus, 100) === {class}"),
                result: result(&response.class_name),
            });
        } else {
            log::warn!(
                "{} {}: unrecognised status '{status}' ignored",
                op.http_method.as_str(),
                op.path
            );
        }
    }

    let mut arms = exact;
    arms.extend(ranges);
    arms.push(ArmCtx {
        condition: "default".to_string(),
        result: default.unwrap_or_else(|| {
            format!(
                "throw new {}($httpStatus, $httpPayload, $httpHeaders)",
                root_fqcn(namespace, "ApiException")
            )
        }),
    });
    arms
}

/// The leading digit of a `4XX` status range.
fn status_class(status: &str) -> Option<char> {
    let mut chars = status.chars();
    let first = chars.next().filter(|c| ('1'..='5').contains(c))?;
    let rest: String = chars.collect();
    rest.eq_ignore_ascii_case("xx").then_some(first)
}
