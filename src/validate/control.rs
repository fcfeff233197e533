//! Control rules: obligatory slots must hold at least one block.

use super::{ValidationContext, Violation, ViolationId};
use crate::catalog::ControlDef;
use crate::graph::BlockId;

pub fn validate_control(
    ctx: &ValidationContext<'_>,
    id: BlockId,
    def: &ControlDef,
) -> Vec<Violation> {
    def.slots
        .iter()
        .filter(|slot| slot.obligatory && ctx.graph.slot_head(id, &slot.name).is_none())
        .map(|slot| {
            Violation::new(
                ViolationId::ControlMissingSlot(slot.name.clone()),
                format!("The \"{}\" slot is required.", slot.display_label()),
            )
        })
        .collect()
}
