//! Deterministic class and method naming.

pub mod class_name;
pub mod operation;

pub use class_name::{capitalize, from_components_key, from_parent_and_property, from_reference_path};
pub use operation::{
    method_identifier, method_name, operation_identity, path_to_camel, response_class_name,
};
