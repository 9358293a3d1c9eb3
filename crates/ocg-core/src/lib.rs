pub mod classify;
pub mod config;
pub mod discover;
pub mod error;
pub mod ir;
pub mod naming;
pub mod parse;
pub mod resolve;
pub mod transform;
pub mod type_hint;

pub use error::GeneratorError;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from an IR spec.
pub trait CodeGenerator {
    fn generate(
        &self,
        ir: &ir::IrSpec,
        config: &config::OcgConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError>;
}
