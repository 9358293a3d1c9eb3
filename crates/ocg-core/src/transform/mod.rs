pub mod name_normalizer;
pub mod spec_to_ir;

pub use spec_to_ir::{DEFAULT_NAMESPACE, TransformOptions, api_class_name, transform, transform_with_options};
