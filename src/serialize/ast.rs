//! AST consumed by the code-generation service.

use serde::{Deserialize, Serialize};

use crate::catalog::SymbolPlacement;
use crate::graph::NodeType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    pub parameters: Vec<AstParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_config: Option<ControlConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_config: Option<OperatorConfig>,
}

/// A field binding carries `value`, an input binding carries `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstParameter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AstNode>>,
}

impl AstParameter {
    pub fn value(key: impl Into<String>, value: impl Into<String>) -> Self {
        AstParameter {
            key: key.into(),
            value: Some(value.into()),
            children: None,
        }
    }

    pub fn children(key: impl Into<String>, children: Vec<AstNode>) -> Self {
        AstParameter {
            key: key.into(),
            value: None,
            children: Some(children),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlConfig {
    pub syntax_end: Option<String>,
    pub slots: Vec<ControlSlotConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSlotConfig {
    pub key: String,
    pub syntax_prefix: Option<String>,
    pub obligatory: bool,
    pub break_line_before: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    pub slots: Vec<OperatorSlotConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSlotConfig {
    pub key: String,
    pub symbol: Option<String>,
    pub symbol_placement: Option<SymbolPlacement>,
}

/// Envelope sent to the execution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub level_id: String,
    pub ast: AstNode,
}
