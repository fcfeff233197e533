//! Catalog phase: definition JSON → compiled, read-only `Catalog`.

pub mod index;
pub mod types;

pub use index::{Catalog, CompiledSyntaxRule, CompiledValidation, Definition, OFFLINE_CATEGORY};
pub use types::*;

use crate::error::EngineError;

/// Deserialize a catalog JSON string into `CliDefinitions`.
pub fn parse(json: &str) -> Result<CliDefinitions, Vec<EngineError>> {
    serde_json::from_str::<CliDefinitions>(json).map_err(|e| {
        vec![EngineError::catalog(
            "C001",
            format!("Failed to parse catalog JSON: {}", e),
        )]
    })
}

/// Parse JSON and compile the catalog in one step.
pub fn load(json: &str) -> Result<Catalog, Vec<EngineError>> {
    let definitions = parse(json)?;
    Catalog::build(definitions)
}

/// Load the catalog if one was supplied, otherwise fall back to offline mode.
pub fn load_or_offline(json: Option<&str>) -> Result<Catalog, Vec<EngineError>> {
    match json {
        Some(json) => load(json),
        None => {
            tracing::warn!("no catalog available, starting in offline mode");
            Ok(Catalog::offline())
        }
    }
}
