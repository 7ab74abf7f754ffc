/// Block-kind property table and the built-in sandbox registry
pub mod properties;
pub mod registry;

pub use properties::{
    BlockKindDef, BlockKindId, BlockPropertyTable, BlockProps, NavClass, Passability, ToolClass,
};
pub use registry::{sandbox_registry, sandbox_table};
