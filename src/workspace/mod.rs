//! The workspace: one block graph plus everything derived from it.
//!
//! Every public mutation ends with a reaction: reachability, then autofix
//! until nothing more is detached, then a full validation pass. When a
//! mutation returns, `enabled` flags, violations and notices are consistent
//! with the graph.

pub mod blocks;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::autofix::{self, Notice};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::diagnostics::{self, DiagnosticReport};
use crate::error::EngineError;
use crate::graph::{BlockGraph, BlockId, BlockInstance, BlockKind, SemanticStore, reachability};
use crate::serialize::{self, AstNode, ExecutionRequest};
use crate::validate::{self, ValidationContext, Violation, ViolationStore};

pub use blocks::{BlockTemplate, slot_key, template_for};

pub struct Workspace {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    graph: BlockGraph,
    semantics: SemanticStore,
    violations: ViolationStore,
    notices: Vec<Notice>,
}

impl Workspace {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let graph = BlockGraph::new();
        let mut semantics = SemanticStore::new();
        semantics.attach(graph.root(), blocks::script_semantic());
        Workspace {
            catalog,
            config,
            graph,
            semantics,
            violations: ViolationStore::new(),
            notices: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    pub fn semantics(&self) -> &SemanticStore {
        &self.semantics
    }

    pub fn root(&self) -> BlockId {
        self.graph.root()
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockInstance> {
        self.graph.get(id)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Create an unconnected block of `kind`. It starts as an orphan.
    pub fn create_block(&mut self, kind: BlockKind) -> Result<BlockId, EngineError> {
        let def = self.catalog.definition(&kind).ok_or_else(|| {
            EngineError::graph("G001", format!("Unknown block kind {:?}", kind), None)
        })?;
        if matches!(kind, BlockKind::Script) {
            return Err(EngineError::graph(
                "G003",
                "A workspace holds exactly one Script block",
                Some(self.graph.root()),
            ));
        }

        let BlockTemplate {
            slots,
            fields,
            semantic,
        } = blocks::template_for(def);
        let id = self.graph.insert(kind, slots, fields);
        self.semantics.attach(id, semantic);
        tracing::debug!(block = %id, "block created");

        self.react()?;
        Ok(id)
    }

    pub fn set_field(
        &mut self,
        id: BlockId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.graph.set_field(id, name, value)?;
        self.react()
    }

    /// Plug `child` and its following siblings at the head of `slot`.
    pub fn attach(&mut self, parent: BlockId, slot: &str, child: BlockId) -> Result<(), EngineError> {
        self.graph.attach_to_slot(parent, slot, child)?;
        self.react()
    }

    pub fn insert_after(&mut self, previous: BlockId, child: BlockId) -> Result<(), EngineError> {
        self.graph.insert_after(previous, child)?;
        self.react()
    }

    /// Unplug `id`. With `heal` only `id` leaves; otherwise the siblings after
    /// it travel along.
    pub fn detach(&mut self, id: BlockId, heal: bool) -> Result<(), EngineError> {
        self.graph.detach(id, heal)?;
        self.react()
    }

    /// Delete `id` and its slot contents. Returns the deleted ids.
    pub fn remove(&mut self, id: BlockId) -> Result<Vec<BlockId>, EngineError> {
        let removed = self.graph.remove(id)?;
        for block in &removed {
            self.semantics.forget(*block);
            self.violations.clear(*block);
        }
        self.react()?;
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Reaction
    // -------------------------------------------------------------------------

    /// Bring derived state back in line with the graph.
    pub fn react(&mut self) -> Result<(), EngineError> {
        let span = tracing::debug_span!("react", workspace = %self.config.workspace_id);
        let _guard = span.enter();

        let bound = self
            .config
            .max_reaction_cycles
            .unwrap_or(self.graph.len() + 1);
        let mut cycles = 0;

        loop {
            reachability::refresh(&mut self.graph);
            let removed = autofix::run(&mut self.graph, &self.catalog, &mut self.notices)?;
            tracing::debug!(cycle = cycles, removed, "reaction cycle");
            if removed == 0 {
                break;
            }
            cycles += 1;
            if cycles > bound {
                // The last pass may have detached blocks.
                reachability::refresh(&mut self.graph);
                self.revalidate();
                let err = EngineError::reaction(
                    "R001",
                    format!("Autofix did not settle within {} cycles", bound),
                );
                tracing::error!(error = %err, "reaction aborted");
                return Err(err);
            }
        }

        self.revalidate();
        Ok(())
    }

    fn revalidate(&mut self) {
        let ctx = ValidationContext {
            graph: &self.graph,
            catalog: &self.catalog,
            semantics: &self.semantics,
            config: &self.config,
        };
        validate::validate_all(&ctx, &mut self.violations);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn violations(&self, id: BlockId) -> &[Violation] {
        self.violations.get(id)
    }

    pub fn all_violations(&self) -> BTreeMap<BlockId, Vec<Violation>> {
        self.violations
            .iter()
            .map(|(id, v)| (id, v.to_vec()))
            .collect()
    }

    /// True while any enabled block carries a violation.
    pub fn is_blocked(&self) -> bool {
        self.violations.iter().any(|(id, v)| {
            !v.is_empty() && self.graph.get(id).is_some_and(|b| b.enabled)
        })
    }

    /// Notices emitted since the last drain, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn diagnostics(&self) -> Vec<DiagnosticReport> {
        diagnostics::report(&self.graph, &self.semantics, &self.violations)
    }

    pub fn serialize(&self) -> Result<AstNode, EngineError> {
        serialize::serialize(&self.graph, &self.semantics)
    }

    /// Serialize and wrap the tree for the execution service.
    pub fn compile(&self, level_id: impl Into<String>) -> Result<ExecutionRequest, EngineError> {
        Ok(ExecutionRequest {
            level_id: level_id.into(),
            ast: self.serialize()?,
        })
    }
}
