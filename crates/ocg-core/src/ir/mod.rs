pub mod entities;
pub mod operations;
pub mod types;

pub use entities::*;
pub use operations::*;
pub use types::{IrApi, IrInfo, IrServer, IrSpec, NormalizedName};
