use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("broken reference {reference}: segment '{segment}' does not exist")]
    BrokenReference { reference: String, segment: String },

    #[error("invalid reference format: {0} (only local '#/...' pointers are supported)")]
    InvalidRefFormat(String),

    #[error("reference {reference} points to a {found}, expected a {expected}")]
    UnexpectedTarget {
        reference: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("circular reference chain: {}", .0.join(" -> "))]
    CircularRef(Vec<String>),
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("invalid components key '{key}': must match {pattern}")]
    InvalidComponentKey { key: String, pattern: &'static str },

    #[error("name collision on '{name}': {first} and {second} both claim it")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("cyclic schema: {}", .chain.join(" -> "))]
    CyclicSchema { chain: Vec<String> },

    #[error("reference {reference} points to a position that has no class name")]
    UnnamedReference { reference: String },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("naming error: {0}")]
    Naming(#[from] NamingError),
}

/// Errors raised by code generators while rendering output.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template error: {0}")]
    Template(String),

    #[error("generation failed: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = NamingError::CyclicSchema {
            chain: vec!["Pet".into(), "PetFood".into(), "Pet".into()],
        };
        assert_eq!(err.to_string(), "cyclic schema: Pet -> PetFood -> Pet");

        let err = ResolveError::BrokenReference {
            reference: "#/components/schemas/Nope".into(),
            segment: "Nope".into(),
        };
        assert!(err.to_string().contains("#/components/schemas/Nope"));
    }
}
