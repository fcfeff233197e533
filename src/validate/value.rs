//! Scalar value rules: catalog regexes applied to operand values and option
//! arguments.

use super::{ValidationContext, Violation, ViolationId};
use crate::catalog::{CommandDef, CompiledValidation, OperandDef};
use crate::graph::{BlockInstance, fields};

pub fn validate_operand_value(
    ctx: &ValidationContext<'_>,
    block: &BlockInstance,
    command: &CommandDef,
    operand: &OperandDef,
) -> Vec<Violation> {
    let value = block.field(fields::VALUE).unwrap_or("");
    let rules = ctx.catalog.operand_validations(command.id(), &operand.id);
    check_rules(rules, value, ViolationId::OperandRegex)
}

/// Only options whose selected flag declares an argument are checked.
pub fn validate_option_argument(
    ctx: &ValidationContext<'_>,
    block: &BlockInstance,
    command: &CommandDef,
) -> Vec<Violation> {
    let Some(flag) = block.field(fields::FLAG) else {
        return vec![];
    };
    let rules = ctx.catalog.argument_validations(command.id(), flag);
    if rules.is_empty() {
        return vec![];
    }
    let value = block.field(fields::OPTION_ARG_VALUE).unwrap_or("");
    check_rules(rules, value, ViolationId::OptionArgRegex)
}

fn check_rules(
    rules: &[CompiledValidation],
    value: &str,
    id: impl Fn(usize) -> ViolationId,
) -> Vec<Violation> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| !rule.regex.is_match(value))
        .map(|(i, rule)| Violation::new(id(i), rule.error_message.clone()))
        .collect()
}
