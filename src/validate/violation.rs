//! Violation records and their per-block store.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::graph::BlockId;

/// Identifies what a violation is about. At most one record per id per block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationId {
    MinOptions,
    MinOperands,
    MissingOperand(String),
    Syntax,
    ControlMissingSlot(String),
    OperatorEmptySlot(String),
    OperatorStackedSlot(String),
    OperandRegex(usize),
    OptionArgRegex(usize),
}

/// Display grouping, in the order diagnostics are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationCategory {
    /// A required sub-part (option, operand, slot content) is absent.
    Missing,
    /// The sequence or arrangement of attached blocks is wrong.
    Sequence,
    Other,
}

impl ViolationId {
    pub fn category(&self) -> ViolationCategory {
        match self {
            ViolationId::MinOptions
            | ViolationId::MinOperands
            | ViolationId::MissingOperand(_)
            | ViolationId::ControlMissingSlot(_)
            | ViolationId::OperatorEmptySlot(_) => ViolationCategory::Missing,
            ViolationId::Syntax | ViolationId::OperatorStackedSlot(_) => {
                ViolationCategory::Sequence
            }
            ViolationId::OperandRegex(_) | ViolationId::OptionArgRegex(_) => {
                ViolationCategory::Other
            }
        }
    }
}

impl std::fmt::Display for ViolationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationId::MinOptions => write!(f, "CARDINALITY_MIN_OPTIONS"),
            ViolationId::MinOperands => write!(f, "CARDINALITY_MIN_OPERANDS"),
            ViolationId::MissingOperand(op) => write!(f, "CARDINALITY_MISSING_OPERAND_{}", op),
            ViolationId::Syntax => write!(f, "SYNTAX_ERROR"),
            ViolationId::ControlMissingSlot(slot) => write!(f, "CONTROL_MISSING_SLOT_{}", slot),
            ViolationId::OperatorEmptySlot(slot) => write!(f, "OPERATOR_EMPTY_SLOT_{}", slot),
            ViolationId::OperatorStackedSlot(slot) => write!(f, "OPERATOR_STACKED_SLOT_{}", slot),
            ViolationId::OperandRegex(i) => write!(f, "OPERAND_REGEX_{}", i),
            ViolationId::OptionArgRegex(i) => write!(f, "OPTION_ARG_REGEX_{}", i),
        }
    }
}

impl Serialize for ViolationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub id: ViolationId,
    pub message: String,
}

impl Violation {
    pub fn new(id: ViolationId, message: impl Into<String>) -> Self {
        Violation {
            id,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViolationStore {
    records: BTreeMap<BlockId, Vec<Violation>>,
}

impl ViolationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one record, replacing any record with the same id.
    pub fn set(&mut self, block: BlockId, violation: Violation) {
        let records = self.records.entry(block).or_default();
        records.retain(|v| v.id != violation.id);
        records.push(violation);
    }

    /// Replace the block's whole set. Later duplicates of an id win.
    pub fn replace(&mut self, block: BlockId, violations: Vec<Violation>) {
        self.records.remove(&block);
        for violation in violations {
            self.set(block, violation);
        }
        if self.records.get(&block).is_some_and(Vec::is_empty) {
            self.records.remove(&block);
        }
    }

    pub fn clear(&mut self, block: BlockId) {
        self.records.remove(&block);
    }

    pub fn get(&self, block: BlockId) -> &[Violation] {
        self.records.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks with at least one violation, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &[Violation])> {
        self.records
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(id, v)| (*id, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.records.values().all(Vec::is_empty)
    }

    pub fn total(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_records_with_same_id() {
        let mut store = ViolationStore::new();
        let block = BlockId(3);
        store.set(block, Violation::new(ViolationId::MinOptions, "first"));
        store.set(block, Violation::new(ViolationId::Syntax, "syntax"));
        store.set(block, Violation::new(ViolationId::MinOptions, "second"));

        let records = store.get(block);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].message, "second");
    }

    #[test]
    fn replace_with_nothing_clears_the_block() {
        let mut store = ViolationStore::new();
        let block = BlockId(1);
        store.set(block, Violation::new(ViolationId::MinOperands, "x"));
        store.replace(block, vec![]);
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn ids_render_with_stable_prefixes() {
        assert_eq!(
            ViolationId::MissingOperand("file".into()).to_string(),
            "CARDINALITY_MISSING_OPERAND_file"
        );
        assert_eq!(
            ViolationId::OperatorStackedSlot("LEFT".into()).to_string(),
            "OPERATOR_STACKED_SLOT_LEFT"
        );
        assert_eq!(ViolationId::OperandRegex(2).to_string(), "OPERAND_REGEX_2");
    }
}
