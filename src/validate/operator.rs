//! Operator rules: every slot holds exactly one block.
//!
//! A stacked slot is reported, never fixed: sequencing inside an operand of an
//! operator needs an explicit grouping block.

use super::{ValidationContext, Violation, ViolationId};
use crate::catalog::OperatorDef;
use crate::graph::BlockId;

pub const STACKED_SLOT_MESSAGE: &str = "Operators accept only one command per slot. \
     Use a grouping or subshell block if you need a sequence.";

pub fn validate_operator(
    ctx: &ValidationContext<'_>,
    id: BlockId,
    def: &OperatorDef,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for slot in &def.slots {
        let Some(head) = ctx.graph.slot_head(id, &slot.name) else {
            violations.push(Violation::new(
                ViolationId::OperatorEmptySlot(slot.name.clone()),
                format!("The \"{}\" slot is required.", slot.display_label()),
            ));
            continue;
        };

        if ctx.graph.next(head).is_some() {
            violations.push(Violation::new(
                ViolationId::OperatorStackedSlot(slot.name.clone()),
                STACKED_SLOT_MESSAGE,
            ));
        }
    }

    violations
}
