pub mod compile;
pub mod context;
pub mod error;
pub mod py;
pub mod registry;
pub mod topo;
pub mod types;
pub mod validate;

pub use compile::{compile, CompileResult, NodeError};
pub use context::{CompileContext, DEFAULT_INPUT_VAR};
pub use error::{
    CompileError, ContextError, GenerateError, PropertyViolation, RegistryError,
};
pub use registry::{
    validate_definition, GenerateFn, NodeDefinition, PropertyKind, PropertySpec,
    RegisterFailure, Registry,
};
pub use topo::topo_order;
pub use types::*;
