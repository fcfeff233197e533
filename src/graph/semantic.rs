//! Semantic metadata attached to blocks.
//!
//! The store is a side table keyed by `BlockId`: a block's visual state never
//! carries it. Entries are written once when a block is created and dropped
//! when the block is deleted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::BlockId;
use crate::catalog::SymbolPlacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Script,
    Command,
    Option,
    Operand,
    Control,
    Operator,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Script => "script",
            NodeType::Command => "command",
            NodeType::Option => "option",
            NodeType::Operand => "operand",
            NodeType::Control => "control",
            NodeType::Operator => "operator",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known AST parameter keys.
pub mod keys {
    pub const COMMANDS: &str = "commands";
    pub const OPTIONS: &str = "options";
    pub const OPERANDS: &str = "operands";
    pub const FLAG: &str = "flag";
    pub const VALUE: &str = "value";
    pub const ARGUMENT: &str = "argument";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingSource {
    Field,
    Input,
}

/// Maps an AST parameter key to the field or slot it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub key: String,
    pub source: BindingSource,
    pub name: String,
}

impl Binding {
    pub fn field(key: &str, name: &str) -> Self {
        Binding {
            key: key.into(),
            source: BindingSource::Field,
            name: name.into(),
        }
    }

    pub fn input(key: &str, name: &str) -> Self {
        Binding {
            key: key.into(),
            source: BindingSource::Input,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSlotSemantic {
    pub name: String,
    pub syntax_prefix: Option<String>,
    pub obligatory: bool,
    pub break_line_before: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSemantic {
    pub syntax_end: Option<String>,
    pub slots: Vec<ControlSlotSemantic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSlotSemantic {
    pub name: String,
    pub symbol: Option<String>,
    pub symbol_placement: Option<SymbolPlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSemantic {
    pub slots: Vec<OperatorSlotSemantic>,
    pub slots_with_implicit_data: Vec<String>,
}

impl OperatorSemantic {
    /// True when the block in `slot` receives its data from the operator.
    pub fn supplies_implicit_data(&self, slot: &str) -> bool {
        self.slots_with_implicit_data.iter().any(|s| s == slot)
    }
}

/// Kind-specific part of the semantic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticDefinition {
    Control(ControlSemantic),
    Operator(OperatorSemantic),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticData {
    pub node_type: NodeType,
    pub name: String,
    pub bindings: Vec<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<SemanticDefinition>,
}

impl SemanticData {
    /// The binding reading from slot `slot`, if any.
    pub fn input_binding(&self, slot: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.source == BindingSource::Input && b.name == slot)
    }

    pub fn control(&self) -> Option<&ControlSemantic> {
        match &self.definition {
            Some(SemanticDefinition::Control(c)) => Some(c),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<&OperatorSemantic> {
        match &self.definition {
            Some(SemanticDefinition::Operator(o)) => Some(o),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SemanticStore {
    entries: HashMap<BlockId, SemanticData>,
}

impl SemanticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the metadata of a freshly created block. Returns false, leaving
    /// the existing entry untouched, if the block already has metadata.
    pub fn attach(&mut self, id: BlockId, data: SemanticData) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, data);
        true
    }

    pub fn get(&self, id: BlockId) -> Option<&SemanticData> {
        self.entries.get(&id)
    }

    pub fn forget(&mut self, id: BlockId) {
        self.entries.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
