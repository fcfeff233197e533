//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Identifies the workspace in log output.
    pub workspace_id: String,
    /// Delimiter appended after each operand name when a command's catalog
    /// entry does not declare its own.
    pub default_sequence_delimiter: String,
    /// Upper bound on reachability/autofix cycles per reaction. Defaults to
    /// the block count plus one, which every terminating reaction fits in.
    pub max_reaction_cycles: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            workspace_id: "default".into(),
            default_sequence_delimiter: "-".into(),
            max_reaction_cycles: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| {
            EngineError::catalog("C001", format!("Failed to parse engine config JSON: {}", e))
        })
    }

    pub fn with_workspace_id(mut self, id: impl Into<String>) -> Self {
        self.workspace_id = id.into();
        self
    }
}
