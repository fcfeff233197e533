//! Serialize phase: block graph → AST.
//!
//! Depth-first from the Script root. Every slot is followed as a stack chain
//! and only enabled blocks are emitted; a disabled block inside a chain is
//! skipped without cutting the chain.

pub mod ast;

pub use ast::{
    AstNode, AstParameter, ControlConfig, ControlSlotConfig, ExecutionRequest, OperatorConfig,
    OperatorSlotConfig,
};

use crate::error::EngineError;
use crate::graph::{BindingSource, BlockGraph, BlockId, NodeType, SemanticData, SemanticStore};
use crate::workspace::slot_key;

/// Serialize the whole graph. Fails when the root is missing or a block
/// reached by the traversal has no semantic metadata.
pub fn serialize(graph: &BlockGraph, semantics: &SemanticStore) -> Result<AstNode, EngineError> {
    let root = graph.root();
    if !graph.contains(root) {
        let err = EngineError::serialize("S002", "Script root not found", None);
        tracing::error!(error = %err, "serialization failed");
        return Err(err);
    }

    let node = serialize_node(graph, semantics, root)?;
    if node.node_type != NodeType::Script {
        return Err(EngineError::serialize(
            "S002",
            "Root block is not a Script",
            Some(root),
        ));
    }
    Ok(node)
}

fn serialize_chain(
    graph: &BlockGraph,
    semantics: &SemanticStore,
    head: Option<BlockId>,
) -> Result<Vec<AstNode>, EngineError> {
    graph
        .chain(head)
        .into_iter()
        .filter(|id| graph.get(*id).is_some_and(|b| b.enabled))
        .map(|id| serialize_node(graph, semantics, id))
        .collect()
}

fn serialize_node(
    graph: &BlockGraph,
    semantics: &SemanticStore,
    id: BlockId,
) -> Result<AstNode, EngineError> {
    let block = graph.block(id)?;
    let data = semantics.get(id).ok_or_else(|| {
        let err = EngineError::serialize(
            "S001",
            format!("Block '{}' has no semantic metadata", id),
            Some(id),
        );
        tracing::error!(error = %err, "serialization failed");
        err
    })?;

    let mut parameters = Vec::with_capacity(data.bindings.len());
    for binding in &data.bindings {
        match binding.source {
            BindingSource::Field => parameters.push(AstParameter::value(
                &binding.key,
                block.field(&binding.name).unwrap_or(""),
            )),
            BindingSource::Input => {
                let head = graph.slot_head(id, &binding.name);
                parameters.push(AstParameter::children(
                    &binding.key,
                    serialize_chain(graph, semantics, head)?,
                ));
            }
        }
    }

    let control_config = data.control().map(|control| ControlConfig {
        syntax_end: control.syntax_end.clone(),
        slots: control
            .slots
            .iter()
            .map(|slot| ControlSlotConfig {
                key: config_key(data, &slot.name),
                syntax_prefix: slot.syntax_prefix.clone(),
                obligatory: slot.obligatory,
                break_line_before: slot.break_line_before,
            })
            .collect(),
    });
    let operator_config = data.operator().map(|operator| OperatorConfig {
        slots: operator
            .slots
            .iter()
            .map(|slot| OperatorSlotConfig {
                key: config_key(data, &slot.name),
                symbol: slot.symbol.clone(),
                symbol_placement: slot.symbol_placement,
            })
            .collect(),
    });

    Ok(AstNode {
        node_type: data.node_type,
        name: data.name.clone(),
        parameters,
        control_config,
        operator_config,
    })
}

/// Config slots carry the same key as the parameter filled from that slot.
fn config_key(data: &SemanticData, slot: &str) -> String {
    data.input_binding(slot)
        .map(|binding| binding.key.clone())
        .unwrap_or_else(|| slot_key(slot))
}
