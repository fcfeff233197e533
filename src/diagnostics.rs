//! Human-readable rendering of the violation store.

use serde::Serialize;

use crate::graph::{BlockGraph, BlockId, NodeType, SemanticStore, fields};
use crate::validate::{Violation, ViolationCategory, ViolationId, ViolationStore};

const MISSING_OPERAND_PREFIX: &str = "Missing operand: ";
const SEPARATOR: &str = "----------------";

/// Remaining problems of one enabled block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub block_id: BlockId,
    pub subject: String,
    /// Missing parts first, then sequence errors, then everything else.
    pub messages: Vec<String>,
    pub warning_text: String,
}

/// One report per enabled block that still carries violations, in block order.
pub fn report(
    graph: &BlockGraph,
    semantics: &SemanticStore,
    violations: &ViolationStore,
) -> Vec<DiagnosticReport> {
    violations
        .iter()
        .filter(|(id, v)| !v.is_empty() && graph.get(*id).is_some_and(|b| b.enabled))
        .map(|(id, v)| DiagnosticReport {
            block_id: id,
            subject: subject(graph, semantics, id),
            messages: ordered(v).into_iter().map(|v| v.message.clone()).collect(),
            warning_text: render_warning_text(v).unwrap_or_default(),
        })
        .collect()
}

/// Display name of a block: `[command] ls`, `[option] -l`, `[operand: file] "x"`.
pub fn subject(graph: &BlockGraph, semantics: &SemanticStore, id: BlockId) -> String {
    let Some(block) = graph.get(id) else {
        return id.to_string();
    };
    let Some(data) = semantics.get(id) else {
        return format!("{:?}", block.kind);
    };

    match data.node_type {
        NodeType::Command | NodeType::Control | NodeType::Operator => {
            format!("[{}] {}", data.node_type, data.name)
        }
        NodeType::Option => {
            let flag = block.field(fields::FLAG).filter(|f| !f.is_empty());
            format!("[option] {}", flag.unwrap_or("?"))
        }
        NodeType::Operand => {
            let value = block.field(fields::VALUE).unwrap_or("");
            format!("[operand: {}] \"{}\"", data.name, value)
        }
        NodeType::Script => format!("[{}]", data.node_type),
    }
}

fn ordered(violations: &[Violation]) -> Vec<&Violation> {
    let mut sorted: Vec<&Violation> = violations.iter().collect();
    sorted.sort_by_key(|v| v.id.category());
    sorted
}

/// Format a block's violations as one tooltip text. `None` when there are none.
///
/// Missing parts come first (specific operands bulleted under a header, then
/// the group minimums and empty required slots), followed by a separator and
/// every other message.
pub fn render_warning_text(violations: &[Violation]) -> Option<String> {
    if violations.is_empty() {
        return None;
    }

    let mut lines = Vec::new();

    let specific: Vec<&Violation> = violations
        .iter()
        .filter(|v| matches!(v.id, ViolationId::MissingOperand(_)))
        .collect();
    if !specific.is_empty() {
        lines.push("Missing operands:".to_string());
        for v in specific {
            let clean = v
                .message
                .strip_prefix(MISSING_OPERAND_PREFIX)
                .unwrap_or(&v.message);
            lines.push(format!("    - {}", clean));
        }
    }
    for id in [ViolationId::MinOperands, ViolationId::MinOptions] {
        if let Some(v) = violations.iter().find(|v| v.id == id) {
            lines.push(format!("* {}", v.message));
        }
    }
    lines.extend(
        violations
            .iter()
            .filter(|v| {
                matches!(
                    v.id,
                    ViolationId::ControlMissingSlot(_) | ViolationId::OperatorEmptySlot(_)
                )
            })
            .map(|v| format!("* {}", v.message)),
    );

    let others: Vec<&Violation> = ordered(violations)
        .into_iter()
        .filter(|v| v.id.category() != ViolationCategory::Missing)
        .collect();
    if !others.is_empty() {
        if !lines.is_empty() {
            lines.push(SEPARATOR.to_string());
        }
        lines.extend(others.iter().map(|v| format!("! {}", v.message)));
    }

    Some(lines.join("\n"))
}
