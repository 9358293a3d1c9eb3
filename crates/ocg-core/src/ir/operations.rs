pub use crate::parse::operation::HttpMethod;
use crate::type_hint::TypeHints;

use super::entities::IrFactory;
use super::types::NormalizedName;

/// A fully resolved API operation.
#[derive(Debug, Clone)]
pub struct IrOperation {
    /// Client method name.
    pub method_name: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<IrParameter>,
    pub request_body: Option<IrRequestBody>,
    pub responses: Vec<IrOperationResponse>,
    pub deprecated: bool,
}

impl IrOperation {
    pub fn parameters_in(&self, location: IrParameterLocation) -> impl Iterator<Item = &IrParameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

/// A resolved path/query/header/cookie parameter.
#[derive(Debug, Clone)]
pub struct IrParameter {
    pub name: NormalizedName,
    pub original_name: String,
    pub location: IrParameterLocation,
    pub hints: TypeHints,
    pub required: bool,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A resolved JSON request body.
#[derive(Debug, Clone)]
pub struct IrRequestBody {
    pub hints: TypeHints,
    pub required: bool,
    pub content_type: String,
    pub description: Option<String>,
}

/// One entry of an operation's `responses`, pointing at its response class.
#[derive(Debug, Clone)]
pub struct IrOperationResponse {
    pub status: String,
    pub class_name: String,
}

/// A response class.
#[derive(Debug, Clone)]
pub struct IrResponse {
    pub name: String,
    /// Status key for operation responses; `None` for components responses.
    pub status: Option<String>,
    pub description: String,
    pub body: Option<IrResponseBody>,
}

/// The JSON body of a response.
#[derive(Debug, Clone)]
pub struct IrResponseBody {
    pub content_type: String,
    pub hints: TypeHints,
    pub raw_hints: TypeHints,
    pub factory: IrFactory,
}
