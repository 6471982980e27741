//! Tool infrastructure — the catalog advertised to the upstream platform.

pub mod catalog;

pub use catalog::{
    execute_action_descriptor, ParamDef, ParamType, ToolCatalog, ToolDescriptor, EXECUTE_ACTION,
};
