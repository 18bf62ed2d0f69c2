pub mod ast;
pub mod error;
pub mod parsing;

// Re-export key types for easier usage
pub use ast::{Node, NodeType, node_type};
pub use error::{Error, Result};
pub use parsing::{
    ParseOptions, Parser,
    content::{Content, Point, Position, Span},
    gfm_registry, gfm_registry_builder, parse,
    registry::{Registry, RegistryBuilder},
};
