//! Command rules: option/operand cardinality and operand token-sequence syntax.

use super::{ValidationContext, Violation, ViolationId};
use crate::catalog::CommandDef;
use crate::graph::{BlockId, BlockKind, slots};

pub const SYNTAX_FALLBACK_MESSAGE: &str =
    "The order or combination of blocks is invalid for this command.";

/// Validate a single command block. Returns all violations found.
pub fn validate_command(
    ctx: &ValidationContext<'_>,
    id: BlockId,
    def: &CommandDef,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let options = attached_options(ctx, id);
    let operands = attached_operands(ctx, id);

    min_options(def, options.len(), &mut violations);

    if !operands_supplied_externally(ctx, id) {
        min_operands(def, operands.len(), &mut violations);
        min_per_operand_kind(ctx, def, &operands, &mut violations);
        operand_syntax(ctx, def, &operands, &mut violations);
    }

    violations
}

/// Option blocks in the OPTIONS slot, in stack order.
pub fn attached_options(ctx: &ValidationContext<'_>, id: BlockId) -> Vec<BlockId> {
    ctx.graph
        .slot_chain(id, slots::OPTIONS)
        .into_iter()
        .filter(|child| {
            ctx.graph
                .get(*child)
                .is_some_and(|b| matches!(b.kind, BlockKind::Option { .. }))
        })
        .collect()
}

/// Operand blocks in the OPERANDS slot, in stack order.
pub fn attached_operands(ctx: &ValidationContext<'_>, id: BlockId) -> Vec<BlockId> {
    ctx.graph
        .slot_chain(id, slots::OPERANDS)
        .into_iter()
        .filter(|child| {
            ctx.graph
                .get(*child)
                .is_some_and(|b| matches!(b.kind, BlockKind::Operand { .. }))
        })
        .collect()
}

/// True when the command sits directly in an operator slot that feeds it data
/// (the right side of a pipe, for instance).
pub fn operands_supplied_externally(ctx: &ValidationContext<'_>, id: BlockId) -> bool {
    let Some((owner, slot)) = ctx.graph.surround_parent(id) else {
        return false;
    };
    ctx.semantics
        .get(owner)
        .and_then(|data| data.operator())
        .is_some_and(|operator| operator.supplies_implicit_data(&slot))
}

fn min_options(def: &CommandDef, count: usize, violations: &mut Vec<Violation>) {
    let Some(min) = def.options_min else { return };
    let missing = (min as usize).saturating_sub(count);
    if missing == 0 {
        return;
    }
    violations.push(Violation::new(
        ViolationId::MinOptions,
        format!("Missing required options ({}).", missing),
    ));
}

fn min_operands(def: &CommandDef, count: usize, violations: &mut Vec<Violation>) {
    let Some(min) = def.operands_min else { return };
    let missing = (min as usize).saturating_sub(count);
    if missing == 0 {
        return;
    }
    violations.push(Violation::new(
        ViolationId::MinOperands,
        format!("Missing required operands ({} at least).", missing),
    ));
}

fn min_per_operand_kind(
    ctx: &ValidationContext<'_>,
    def: &CommandDef,
    operands: &[BlockId],
    violations: &mut Vec<Violation>,
) {
    for operand_def in &def.operands {
        let count = operands
            .iter()
            .filter(|id| {
                matches!(
                    ctx.graph.get(**id).map(|b| &b.kind),
                    Some(BlockKind::Operand { operand, .. }) if *operand == operand_def.id
                )
            })
            .count();
        let missing = (operand_def.cardinality.min as usize).saturating_sub(count);
        if missing == 0 {
            continue;
        }
        violations.push(Violation::new(
            ViolationId::MissingOperand(operand_def.id.clone()),
            format!(
                "Missing operand: {} (needs {}).",
                operand_def.display_label(),
                missing
            ),
        ));
    }
}

/// The operand sequence as matched by syntax rules: each operand's semantic
/// name followed by the delimiter, concatenated.
pub fn normalized_sequence(
    ctx: &ValidationContext<'_>,
    def: &CommandDef,
    operands: &[BlockId],
) -> String {
    let delimiter = def
        .operand_ids_sequence_delimiter
        .as_deref()
        .unwrap_or(&ctx.config.default_sequence_delimiter);
    operands
        .iter()
        .filter_map(|id| ctx.semantics.get(*id))
        .map(|data| format!("{}{}", data.name, delimiter))
        .collect()
}

fn operand_syntax(
    ctx: &ValidationContext<'_>,
    def: &CommandDef,
    operands: &[BlockId],
    violations: &mut Vec<Violation>,
) {
    let rules = ctx.catalog.syntax_rules(def.id());
    if rules.is_empty() {
        return;
    }

    let sequence = normalized_sequence(ctx, def, operands);

    // First matching rule decides, even if a later one would match too.
    for rule in rules {
        if !rule.regex.is_match(&sequence) {
            continue;
        }
        if let Some(message) = rule.error_message.as_ref().filter(|m| !m.is_empty()) {
            violations.push(Violation::new(ViolationId::Syntax, message.clone()));
        }
        return;
    }

    violations.push(Violation::new(ViolationId::Syntax, SYNTAX_FALLBACK_MESSAGE));
}
