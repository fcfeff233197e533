//! Auto-repair of deterministically resolvable violations.
//!
//! Every fix detaches a block from its command (healing the stack), which
//! strictly shrinks the set of enabled blocks. One notice is emitted per fix.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{Catalog, CommandDef};
use crate::error::EngineError;
use crate::graph::{BlockGraph, BlockId, BlockKind, fields, slots};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// A user-facing message describing an automatic change to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// The block that was removed.
    pub block_id: Option<BlockId>,
}

impl Notice {
    fn warn(message: String, block_id: BlockId) -> Self {
        tracing::warn!(block = %block_id, "{}", message);
        Notice {
            level: NoticeLevel::Warn,
            message,
            block_id: Some(block_id),
        }
    }
}

/// Run one autofix pass over every enabled command. Returns how many blocks
/// were detached.
pub fn run(
    graph: &mut BlockGraph,
    catalog: &Catalog,
    notices: &mut Vec<Notice>,
) -> Result<usize, EngineError> {
    let mut removed = 0;

    for id in graph.ids() {
        let Some(block) = graph.get(id) else { continue };
        if !block.enabled {
            continue;
        }
        let BlockKind::Command { command } = &block.kind else {
            continue;
        };
        let Some(def) = catalog.command(command) else {
            continue;
        };

        removed += fix_command(graph, id, def, notices)?;
    }

    Ok(removed)
}

/// Apply all three fixes to one command.
pub fn fix_command(
    graph: &mut BlockGraph,
    id: BlockId,
    def: &CommandDef,
    notices: &mut Vec<Notice>,
) -> Result<usize, EngineError> {
    let mut removed = 0;
    removed += unplug_first_duplicate(graph, id, notices)?;
    removed += unplug_exclusive_options(graph, id, &def.exclusive_options, notices)?;
    removed += trim_excess_operands(graph, id, def, notices)?;
    Ok(removed)
}

fn option_flag(graph: &BlockGraph, id: BlockId) -> String {
    graph
        .get(id)
        .and_then(|b| b.field(fields::FLAG))
        .unwrap_or("")
        .to_string()
}

fn option_blocks(graph: &BlockGraph, command: BlockId) -> Vec<BlockId> {
    graph
        .slot_chain(command, slots::OPTIONS)
        .into_iter()
        .filter(|id| {
            graph
                .get(*id)
                .is_some_and(|b| matches!(b.kind, BlockKind::Option { .. }))
        })
        .collect()
}

/// Detach the first option whose flag was already seen. At most one per pass.
fn unplug_first_duplicate(
    graph: &mut BlockGraph,
    command: BlockId,
    notices: &mut Vec<Notice>,
) -> Result<usize, EngineError> {
    let mut seen = HashSet::new();
    for option in option_blocks(graph, command) {
        let flag = option_flag(graph, option);
        if seen.contains(&flag) {
            graph.detach(option, true)?;
            notices.push(Notice::warn(
                format!("Option \"{}\" removed as a duplicate.", flag),
                option,
            ));
            return Ok(1);
        }
        seen.insert(flag);
    }
    Ok(0)
}

/// Within each exclusive group the first attached option is kept; every other
/// member is detached.
fn unplug_exclusive_options(
    graph: &mut BlockGraph,
    command: BlockId,
    groups: &[Vec<String>],
    notices: &mut Vec<Notice>,
) -> Result<usize, EngineError> {
    let mut removed = 0;

    for group in groups {
        loop {
            let found: Vec<(BlockId, String)> = option_blocks(graph, command)
                .into_iter()
                .map(|id| (id, option_flag(graph, id)))
                .filter(|(_, flag)| group.contains(flag))
                .collect();
            if found.len() <= 1 {
                break;
            }

            let (_, keeper_flag) = &found[0];
            let (intruder, intruder_flag) = &found[1];
            graph.detach(*intruder, true)?;
            removed += 1;
            notices.push(Notice::warn(
                format!(
                    "Conflict: option \"{}\" cannot be used with \"{}\".",
                    intruder_flag, keeper_flag
                ),
                *intruder,
            ));
        }
    }

    Ok(removed)
}

/// Detach operands beyond each kind's finite maximum, keeping stack order.
fn trim_excess_operands(
    graph: &mut BlockGraph,
    command: BlockId,
    def: &CommandDef,
    notices: &mut Vec<Notice>,
) -> Result<usize, EngineError> {
    let mut removed = 0;
    let attached = graph.slot_chain(command, slots::OPERANDS);

    for operand_def in &def.operands {
        let Some(max) = operand_def.cardinality.max.limit() else {
            continue;
        };
        let of_kind: Vec<BlockId> = attached
            .iter()
            .copied()
            .filter(|id| {
                matches!(
                    graph.get(*id).map(|b| &b.kind),
                    Some(BlockKind::Operand { operand, .. }) if *operand == operand_def.id
                )
            })
            .collect();
        if of_kind.len() <= max as usize {
            continue;
        }

        let excess = &of_kind[max as usize..];
        for id in excess {
            graph.detach(*id, true)?;
        }
        removed += excess.len();
        notices.push(Notice::warn(
            format!(
                "Limit of {} exceeded for \"{}\".",
                max,
                operand_def.display_label()
            ),
            excess[0],
        ));
    }

    Ok(removed)
}
