//! Unified engine error type used across all phases.
//!
//! Only programmer/catalog-integrity failures and graph misuse end up here.
//! User-correctable problems are violations (see `validate`), never errors.

use crate::graph::BlockId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Catalog,
    Graph,
    Reaction,
    Serialize,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Catalog => write!(f, "Catalog"),
            Phase::Graph => write!(f, "Graph"),
            Phase::Reaction => write!(f, "Reaction"),
            Phase::Serialize => write!(f, "Serialize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{phase}:{code}] {message}{}", block_suffix(.block_id))]
pub struct EngineError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub block_id: Option<BlockId>,
}

fn block_suffix(block_id: &Option<BlockId>) -> String {
    match block_id {
        Some(id) => format!(" (block '{}')", id),
        None => String::new(),
    }
}

impl EngineError {
    pub fn catalog(code: &str, message: impl Into<String>) -> Self {
        EngineError {
            code: code.into(),
            phase: Phase::Catalog,
            message: message.into(),
            block_id: None,
        }
    }

    pub fn graph(code: &str, message: impl Into<String>, block_id: Option<BlockId>) -> Self {
        EngineError {
            code: code.into(),
            phase: Phase::Graph,
            message: message.into(),
            block_id,
        }
    }

    pub fn reaction(code: &str, message: impl Into<String>) -> Self {
        EngineError {
            code: code.into(),
            phase: Phase::Reaction,
            message: message.into(),
            block_id: None,
        }
    }

    pub fn serialize(code: &str, message: impl Into<String>, block_id: Option<BlockId>) -> Self {
        EngineError {
            code: code.into(),
            phase: Phase::Serialize,
            message: message.into(),
            block_id,
        }
    }
}
