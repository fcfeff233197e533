//! Constraint validation.
//!
//! Each pass clears and recomputes the full violation set of every enabled
//! block from its currently attached children. Violations are data: nothing
//! here fails for a user-correctable condition.

pub mod command;
pub mod control;
pub mod operator;
pub mod value;
pub mod violation;

pub use violation::{Violation, ViolationCategory, ViolationId, ViolationStore};

use crate::catalog::{Catalog, Definition};
use crate::config::EngineConfig;
use crate::graph::{BlockGraph, BlockId, SemanticStore};

/// Read-only view of everything a rule needs.
pub struct ValidationContext<'a> {
    pub graph: &'a BlockGraph,
    pub catalog: &'a Catalog,
    pub semantics: &'a SemanticStore,
    pub config: &'a EngineConfig,
}

/// Recompute violations for every block. Disabled blocks end up with none.
pub fn validate_all(ctx: &ValidationContext<'_>, store: &mut ViolationStore) {
    for id in ctx.graph.ids() {
        let enabled = ctx.graph.get(id).is_some_and(|b| b.enabled);
        if enabled {
            store.replace(id, validate_block(ctx, id));
        } else {
            store.clear(id);
        }
    }
}

/// Compute the violation set of a single block.
pub fn validate_block(ctx: &ValidationContext<'_>, id: BlockId) -> Vec<Violation> {
    let Some(block) = ctx.graph.get(id) else {
        return vec![];
    };

    match ctx.catalog.definition(&block.kind) {
        Some(Definition::Command(def)) => command::validate_command(ctx, id, def),
        Some(Definition::Control(def)) => control::validate_control(ctx, id, def),
        Some(Definition::Operator(def)) => operator::validate_operator(ctx, id, def),
        Some(Definition::Operand { command, operand }) => {
            value::validate_operand_value(ctx, block, command, operand)
        }
        Some(Definition::Option(command)) => value::validate_option_argument(ctx, block, command),
        Some(Definition::Script) | None => vec![],
    }
}
