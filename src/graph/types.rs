//! Block, link and kind types of the block graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Slot names used by the built-in block kinds.
pub mod slots {
    pub const STACK: &str = "STACK";
    pub const OPTIONS: &str = "OPTIONS";
    pub const OPERANDS: &str = "OPERANDS";
}

/// Field names used by the built-in block kinds.
pub mod fields {
    pub const FLAG: &str = "FLAG";
    pub const VALUE: &str = "VALUE";
    pub const OPTION_ARG_VALUE: &str = "OPTION_ARG_VALUE";
}

/// Stable identity of a block. Never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// BLOCK KIND: closed set of kinds, each pointing into the catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockKind {
    Script,
    Command { command: String },
    Option { command: String },
    Operand { command: String, operand: String },
    Control { control: String },
    Operator { operator: String },
}

impl BlockKind {
    pub fn command(id: impl Into<String>) -> Self {
        BlockKind::Command { command: id.into() }
    }

    pub fn option(command: impl Into<String>) -> Self {
        BlockKind::Option {
            command: command.into(),
        }
    }

    pub fn operand(command: impl Into<String>, operand: impl Into<String>) -> Self {
        BlockKind::Operand {
            command: command.into(),
            operand: operand.into(),
        }
    }

    pub fn control(id: impl Into<String>) -> Self {
        BlockKind::Control { control: id.into() }
    }

    pub fn operator(id: impl Into<String>) -> Self {
        BlockKind::Operator {
            operator: id.into(),
        }
    }

    /// The tag this block presents on its previous/next connections.
    /// The Script root has no stack connections.
    pub fn statement_tag(&self) -> Option<StatementTag> {
        match self {
            BlockKind::Script => None,
            BlockKind::Command { .. } | BlockKind::Control { .. } | BlockKind::Operator { .. } => {
                Some(StatementTag::Command)
            }
            BlockKind::Option { command } => Some(StatementTag::Option(command.clone())),
            BlockKind::Operand { command, .. } => Some(StatementTag::Operand(command.clone())),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, BlockKind::Command { .. })
    }
}

/// Connection-compatibility tag. Two connections fit only when tags are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementTag {
    Command,
    Option(String),
    Operand(String),
}

impl StatementTag {
    /// Parse a catalog `check` string.
    pub fn from_check(check: &str) -> Self {
        if let Some(command) = check.strip_suffix("_option") {
            StatementTag::Option(command.to_string())
        } else if let Some(command) = check.strip_suffix("_operand") {
            StatementTag::Operand(command.to_string())
        } else {
            StatementTag::Command
        }
    }
}

impl std::fmt::Display for StatementTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementTag::Command => write!(f, "command"),
            StatementTag::Option(command) => write!(f, "{}_option", command),
            StatementTag::Operand(command) => write!(f, "{}_operand", command),
        }
    }
}

// =============================================================================
// BLOCK INSTANCE
// =============================================================================

/// A named socket on a block and the statement tag it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: String,
    pub accepts: StatementTag,
}

#[derive(Debug, Clone)]
pub struct BlockInstance {
    pub id: BlockId,
    pub kind: BlockKind,
    pub fields: BTreeMap<String, String>,
    pub slots: Vec<SlotSpec>,
    /// True iff the block is reachable from the Script root.
    pub enabled: bool,
}

impl BlockInstance {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// Edge label. `Slot` points from a block to the head of a slot's chain,
/// `Next` from a block to its following sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Slot(String),
    Next,
}
