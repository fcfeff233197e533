use std::sync::Arc;

use shellblocks::catalog::{self, Catalog};
use shellblocks::config::EngineConfig;
use shellblocks::graph::{BlockId, BlockKind, fields, slots};
use shellblocks::validate::Violation;
use shellblocks::workspace::Workspace;

// =============================================================================
// Catalog & workspace
// =============================================================================

pub const CATALOG_JSON: &str = include_str!("../fixtures/catalog.json");

pub fn catalog() -> Arc<Catalog> {
    Arc::new(catalog::load(CATALOG_JSON).expect("fixture catalog should load"))
}

pub fn workspace() -> Workspace {
    Workspace::new(catalog(), EngineConfig::default())
}

pub fn workspace_with(config: EngineConfig) -> Workspace {
    Workspace::new(catalog(), config)
}

// =============================================================================
// Graph builders
// =============================================================================

/// Append `child` at the end of `slot`, or make it the head when empty.
pub fn append(ws: &mut Workspace, parent: BlockId, slot: &str, child: BlockId) {
    let tail = ws.graph().slot_chain(parent, slot).last().copied();
    match tail {
        Some(tail) => ws.insert_after(tail, child).unwrap(),
        None => ws.attach(parent, slot, child).unwrap(),
    }
}

/// A command appended to the Script stack.
pub fn script_command(ws: &mut Workspace, command: &str) -> BlockId {
    let id = ws.create_block(BlockKind::command(command)).unwrap();
    let root = ws.root();
    append(ws, root, slots::STACK, id);
    id
}

/// A command that is not connected to anything.
pub fn loose_command(ws: &mut Workspace, command: &str) -> BlockId {
    ws.create_block(BlockKind::command(command)).unwrap()
}

/// An option with `flag` selected, appended to the command's OPTIONS slot.
pub fn add_option(ws: &mut Workspace, cmd: BlockId, command: &str, flag: &str) -> BlockId {
    let id = ws.create_block(BlockKind::option(command)).unwrap();
    ws.set_field(id, fields::FLAG, flag).unwrap();
    append(ws, cmd, slots::OPTIONS, id);
    id
}

/// An operand holding `value`, appended to the command's OPERANDS slot.
pub fn add_operand(
    ws: &mut Workspace,
    cmd: BlockId,
    command: &str,
    operand: &str,
    value: &str,
) -> BlockId {
    let id = ws.create_block(BlockKind::operand(command, operand)).unwrap();
    ws.set_field(id, fields::VALUE, value).unwrap();
    append(ws, cmd, slots::OPERANDS, id);
    id
}

// =============================================================================
// Assertions
// =============================================================================

pub fn violation_ids(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.id.to_string()).collect()
}

pub fn option_flags(ws: &Workspace, cmd: BlockId) -> Vec<String> {
    ws.graph()
        .slot_chain(cmd, slots::OPTIONS)
        .into_iter()
        .filter_map(|id| ws.block(id).and_then(|b| b.field(fields::FLAG)).map(String::from))
        .collect()
}
