//! Block graph model: blocks, slot/stack links, semantic metadata and reachability.

pub mod block_graph;
pub mod reachability;
pub mod semantic;
pub mod types;

pub use block_graph::BlockGraph;
pub use semantic::{Binding, BindingSource, NodeType, SemanticData, SemanticStore};
pub use types::*;
