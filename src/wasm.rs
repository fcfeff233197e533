//! WASM entry points for browser use.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::autofix::Notice;
use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticReport;
use crate::error::EngineError;
use crate::graph::{BlockId, BlockKind};
use crate::serialize::ExecutionRequest;
use crate::workspace::Workspace;

/// Validate a catalog JSON without creating a workspace.
/// Returns a JSON array of EngineError objects (empty when the catalog loads).
#[wasm_bindgen]
pub fn validate_catalog(json: &str) -> JsValue {
    let result = validate_catalog_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_catalog_inner(json: &str) -> Vec<ErrorDto> {
    match crate::catalog::load(json) {
        Ok(_) => vec![],
        Err(errors) => errors.into_iter().map(ErrorDto::from).collect(),
    }
}

/// A block workspace driven from JavaScript. Block ids cross the boundary as
/// plain numbers.
#[wasm_bindgen]
pub struct ShellWorkspace {
    inner: Workspace,
}

#[wasm_bindgen]
impl ShellWorkspace {
    /// Without a catalog the workspace starts in offline mode.
    #[wasm_bindgen(constructor)]
    pub fn new(
        catalog_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<ShellWorkspace, JsValue> {
        new_workspace_inner(catalog_json.as_deref(), config_json.as_deref())
            .map(|inner| ShellWorkspace { inner })
            .map_err(|errors| serde_wasm_bindgen::to_value(&errors).unwrap_or(JsValue::NULL))
    }

    #[wasm_bindgen(js_name = rootId)]
    pub fn root_id(&self) -> f64 {
        self.inner.root().0 as f64
    }

    /// `kind_json` is a tagged kind, e.g. `{"kind":"command","command":"ls"}`.
    #[wasm_bindgen(js_name = createBlock)]
    pub fn create_block(&mut self, kind_json: &str) -> JsValue {
        to_js(&create_block_inner(&mut self.inner, kind_json))
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, id: f64, name: &str, value: &str) -> JsValue {
        to_js(&set_field_inner(&mut self.inner, id, name, value))
    }

    pub fn attach(&mut self, parent: f64, slot: &str, child: f64) -> JsValue {
        to_js(&attach_inner(&mut self.inner, parent, slot, child))
    }

    #[wasm_bindgen(js_name = insertAfter)]
    pub fn insert_after(&mut self, previous: f64, child: f64) -> JsValue {
        to_js(&insert_after_inner(&mut self.inner, previous, child))
    }

    pub fn detach(&mut self, id: f64, heal: bool) -> JsValue {
        to_js(&detach_inner(&mut self.inner, id, heal))
    }

    pub fn remove(&mut self, id: f64) -> JsValue {
        to_js(&remove_inner(&mut self.inner, id))
    }

    pub fn diagnostics(&self) -> JsValue {
        to_js(&self.inner.diagnostics())
    }

    #[wasm_bindgen(js_name = isBlocked)]
    pub fn is_blocked(&self) -> bool {
        self.inner.is_blocked()
    }

    /// Serialize the workspace and wrap it for the execution service.
    pub fn compile(&self, level_id: &str) -> JsValue {
        to_js(&compile_inner(&self.inner, level_id))
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Largest integer a JS number holds exactly.
const MAX_SAFE_ID: f64 = 9_007_199_254_740_991.0;

/// Ids arrive as JS numbers; anything but a non-negative integer is rejected.
fn block_id(id: f64) -> Result<BlockId, EngineError> {
    if !id.is_finite() || id < 0.0 || id.fract() != 0.0 || id > MAX_SAFE_ID {
        return Err(EngineError::graph(
            "G002",
            format!("Invalid block id: {}", id),
            None,
        ));
    }
    Ok(BlockId(id as u64))
}

fn set_field_inner(ws: &mut Workspace, id: f64, name: &str, value: &str) -> MutationResult {
    let outcome = block_id(id)
        .and_then(|id| ws.set_field(id, name, value))
        .map(|_| vec![]);
    mutation_result(ws, outcome)
}

fn attach_inner(ws: &mut Workspace, parent: f64, slot: &str, child: f64) -> MutationResult {
    let outcome = block_id(parent)
        .and_then(|parent| Ok((parent, block_id(child)?)))
        .and_then(|(parent, child)| ws.attach(parent, slot, child))
        .map(|_| vec![]);
    mutation_result(ws, outcome)
}

fn insert_after_inner(ws: &mut Workspace, previous: f64, child: f64) -> MutationResult {
    let outcome = block_id(previous)
        .and_then(|previous| Ok((previous, block_id(child)?)))
        .and_then(|(previous, child)| ws.insert_after(previous, child))
        .map(|_| vec![]);
    mutation_result(ws, outcome)
}

fn detach_inner(ws: &mut Workspace, id: f64, heal: bool) -> MutationResult {
    let outcome = block_id(id)
        .and_then(|id| ws.detach(id, heal))
        .map(|_| vec![]);
    mutation_result(ws, outcome)
}

fn remove_inner(ws: &mut Workspace, id: f64) -> MutationResult {
    let outcome = block_id(id).and_then(|id| ws.remove(id));
    mutation_result(ws, outcome)
}

fn new_workspace_inner(
    catalog_json: Option<&str>,
    config_json: Option<&str>,
) -> Result<Workspace, Vec<ErrorDto>> {
    let catalog = crate::catalog::load_or_offline(catalog_json)
        .map_err(|errors| errors.into_iter().map(ErrorDto::from).collect::<Vec<_>>())?;
    let config = match config_json {
        Some(json) => EngineConfig::from_json(json).map_err(|e| vec![ErrorDto::from(e)])?,
        None => EngineConfig::default(),
    };
    Ok(Workspace::new(Arc::new(catalog), config))
}

fn create_block_inner(ws: &mut Workspace, kind_json: &str) -> MutationResult {
    let outcome = serde_json::from_str::<BlockKind>(kind_json)
        .map_err(|e| EngineError::graph("G001", format!("Invalid block kind JSON: {}", e), None))
        .and_then(|kind| ws.create_block(kind))
        .map(|id| vec![id]);
    mutation_result(ws, outcome)
}

fn mutation_result(ws: &mut Workspace, outcome: Result<Vec<BlockId>, EngineError>) -> MutationResult {
    match outcome {
        Ok(block_ids) => MutationResult::Success {
            block_ids,
            notices: ws.drain_notices(),
            diagnostics: ws.diagnostics(),
            blocked: ws.is_blocked(),
        },
        Err(e) => MutationResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

fn compile_inner(ws: &Workspace, level_id: &str) -> CompileResult {
    match ws.compile(level_id) {
        Ok(request) => CompileResult::Success { request },
        Err(e) => CompileResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    block_id: Option<u64>,
}

impl From<EngineError> for ErrorDto {
    fn from(e: EngineError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            block_id: e.block_id.map(|id| id.0),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum MutationResult {
    #[serde(rename = "success", rename_all = "camelCase")]
    Success {
        block_ids: Vec<BlockId>,
        notices: Vec<Notice>,
        diagnostics: Vec<DiagnosticReport>,
        blocked: bool,
    },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum CompileResult {
    #[serde(rename = "success")]
    Success { request: ExecutionRequest },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
