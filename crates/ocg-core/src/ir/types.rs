use std::fmt;

/// Everything an emitter needs, resolved and named.
#[derive(Debug, Clone)]
pub struct IrSpec {
    pub info: IrInfo,
    pub servers: Vec<IrServer>,
    /// Root namespace generated names are qualified with.
    pub namespace: String,
    pub entities: Vec<IrEntity>,
    pub responses: Vec<IrResponse>,
    pub operations: Vec<IrOperation>,
    pub apis: Vec<IrApi>,
}

impl IrSpec {
    pub fn entity(&self, name: &str) -> Option<&IrEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn response(&self, name: &str) -> Option<&IrResponse> {
        self.responses.iter().find(|r| r.name == name)
    }

    pub fn operation(&self, method_name: &str) -> Option<&IrOperation> {
        self.operations.iter().find(|op| op.method_name == method_name)
    }
}

/// API metadata.
#[derive(Debug, Clone)]
pub struct IrInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    /// SPDX identifier when declared, otherwise the license name.
    pub license: Option<String>,
}

/// A server URL with its variables substituted by their defaults.
#[derive(Debug, Clone)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}

/// A façade class grouping the operations of one tag.
#[derive(Debug, Clone)]
pub struct IrApi {
    pub tag: NormalizedName,
    pub class_name: String,
    pub description: Option<String>,
    pub operations: Vec<usize>, // indices into IrSpec.operations
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

use super::entities::*;
use super::operations::*;
