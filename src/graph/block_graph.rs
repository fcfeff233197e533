//! petgraph-based block graph.
//!
//! Blocks are nodes; slot and stack links are edges. Every block has at most
//! one incoming edge (its parent slot or its previous sibling), at most one
//! outgoing `Next` edge and at most one outgoing edge per slot. Removing a node
//! from the stable graph drops its edges, so no dangling link can survive.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use super::types::*;
use crate::error::EngineError;

pub struct BlockGraph {
    pub(crate) graph: StableDiGraph<BlockInstance, Link>,
    pub(crate) node_indices: BTreeMap<BlockId, NodeIndex>,
    next_id: u64,
    root: BlockId,
}

impl Default for BlockGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGraph {
    /// Create a graph holding only the Script root.
    pub fn new() -> Self {
        let mut graph = BlockGraph {
            graph: StableDiGraph::new(),
            node_indices: BTreeMap::new(),
            next_id: 0,
            root: BlockId(0),
        };
        let root = graph.insert(
            BlockKind::Script,
            vec![SlotSpec {
                name: slots::STACK.into(),
                accepts: StatementTag::Command,
            }],
            BTreeMap::new(),
        );
        graph.root = root;
        if let Some(&idx) = graph.node_indices.get(&root) {
            graph.graph[idx].enabled = true;
        }
        graph
    }

    pub fn root(&self) -> BlockId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.node_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_indices.is_empty()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.node_indices.contains_key(&id)
    }

    /// All block ids in creation order.
    pub fn ids(&self) -> Vec<BlockId> {
        self.node_indices.keys().copied().collect()
    }

    /// Add an unconnected block. New blocks start disabled until the next
    /// reachability pass.
    pub fn insert(
        &mut self,
        kind: BlockKind,
        slots: Vec<SlotSpec>,
        fields: BTreeMap<String, String>,
    ) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let idx = self.graph.add_node(BlockInstance {
            id,
            kind,
            fields,
            slots,
            enabled: false,
        });
        self.node_indices.insert(id, idx);
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockInstance> {
        self.node_indices.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn block(&self, id: BlockId) -> Result<&BlockInstance, EngineError> {
        self.get(id).ok_or_else(|| unknown_block(id))
    }

    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut BlockInstance, EngineError> {
        let idx = self.index(id)?;
        Ok(&mut self.graph[idx])
    }

    pub fn set_field(
        &mut self,
        id: BlockId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.block_mut(id)?
            .fields
            .insert(name.to_string(), value.into());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn slot_head(&self, id: BlockId, slot: &str) -> Option<BlockId> {
        let idx = *self.node_indices.get(&id)?;
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .find(|e| matches!(e.weight(), Link::Slot(name) if name == slot))
            .map(|e| self.graph[e.target()].id)
    }

    pub fn next(&self, id: BlockId) -> Option<BlockId> {
        let idx = *self.node_indices.get(&id)?;
        self.next_edge(idx).map(|e| self.graph[e.1].id)
    }

    /// The block and link pointing at `id`, if any.
    pub fn parent(&self, id: BlockId) -> Option<(BlockId, Link)> {
        let idx = *self.node_indices.get(&id)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| (self.graph[e.source()].id, e.weight().clone()))
    }

    pub fn previous(&self, id: BlockId) -> Option<BlockId> {
        match self.parent(id)? {
            (prev, Link::Next) => Some(prev),
            (_, Link::Slot(_)) => None,
        }
    }

    /// The block whose slot holds the chain `id` belongs to, with the slot name.
    pub fn surround_parent(&self, id: BlockId) -> Option<(BlockId, String)> {
        let mut current = id;
        loop {
            match self.parent(current)? {
                (prev, Link::Next) => current = prev,
                (owner, Link::Slot(slot)) => return Some((owner, slot)),
            }
        }
    }

    /// The topmost ancestor of `id` (itself when unconnected).
    pub fn root_of(&self, id: BlockId) -> BlockId {
        let mut current = id;
        while let Some((parent, _)) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// The sequence of blocks starting at `head` and following `Next` links.
    pub fn chain(&self, head: Option<BlockId>) -> Vec<BlockId> {
        let mut blocks = Vec::new();
        let mut current = head;
        while let Some(id) = current {
            blocks.push(id);
            current = self.next(id);
        }
        blocks
    }

    pub fn slot_chain(&self, id: BlockId, slot: &str) -> Vec<BlockId> {
        self.chain(self.slot_head(id, slot))
    }

    pub fn stack_tail(&self, id: BlockId) -> BlockId {
        let mut current = id;
        while let Some(next) = self.next(current) {
            current = next;
        }
        current
    }

    /// True when `ancestor` is `id` or sits above it in the graph.
    pub fn is_ancestor(&self, ancestor: BlockId, id: BlockId) -> bool {
        let mut current = id;
        loop {
            if current == ancestor {
                return true;
            }
            match self.parent(current) {
                Some((parent, _)) => current = parent,
                None => return false,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Plug `child` (with the siblings following it) at the head of `slot`.
    /// Whatever occupied the slot is re-attached after the plugged stack.
    pub fn attach_to_slot(
        &mut self,
        parent: BlockId,
        slot: &str,
        child: BlockId,
    ) -> Result<(), EngineError> {
        self.ensure_movable(child)?;
        let parent_block = self.block(parent)?;
        let accepts = parent_block
            .slot(slot)
            .map(|s| s.accepts.clone())
            .ok_or_else(|| {
                EngineError::graph(
                    "G006",
                    format!("Block has no slot named '{}'", slot),
                    Some(parent),
                )
            })?;
        self.ensure_compatible(&accepts, child)?;
        self.ensure_acyclic(child, parent)?;

        self.detach(child, false)?;

        let parent_idx = self.index(parent)?;
        let child_idx = self.index(child)?;
        let displaced = self
            .slot_edge(parent_idx, slot)
            .map(|(edge, target)| {
                self.graph.remove_edge(edge);
                target
            });

        self.graph
            .add_edge(parent_idx, child_idx, Link::Slot(slot.to_string()));
        if let Some(displaced) = displaced {
            let tail = self.index(self.stack_tail(child))?;
            self.graph.add_edge(tail, displaced, Link::Next);
        }
        Ok(())
    }

    /// Plug `child` (with the siblings following it) directly after `previous`.
    pub fn insert_after(&mut self, previous: BlockId, child: BlockId) -> Result<(), EngineError> {
        self.ensure_movable(child)?;
        let tag = self.block(previous)?.kind.statement_tag().ok_or_else(|| {
            EngineError::graph(
                "G004",
                "Block has no next connection",
                Some(previous),
            )
        })?;
        self.ensure_compatible(&tag, child)?;
        self.ensure_acyclic(child, previous)?;

        self.detach(child, false)?;

        let prev_idx = self.index(previous)?;
        let child_idx = self.index(child)?;
        let displaced = self.next_edge(prev_idx).map(|(edge, target)| {
            self.graph.remove_edge(edge);
            target
        });

        self.graph.add_edge(prev_idx, child_idx, Link::Next);
        if let Some(displaced) = displaced {
            let tail = self.index(self.stack_tail(child))?;
            self.graph.add_edge(tail, displaced, Link::Next);
        }
        Ok(())
    }

    /// Disconnect `id` from its parent. With `heal`, the following sibling
    /// takes its place and `id` leaves alone; otherwise the siblings after it
    /// travel with it.
    pub fn detach(&mut self, id: BlockId, heal: bool) -> Result<(), EngineError> {
        self.ensure_movable(id)?;
        let idx = self.index(id)?;

        let incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| (e.id(), e.source(), e.weight().clone()));
        let Some((edge, parent_idx, link)) = incoming else {
            return Ok(());
        };
        self.graph.remove_edge(edge);

        if heal {
            if let Some((next_edge, next_idx)) = self.next_edge(idx) {
                self.graph.remove_edge(next_edge);
                self.graph.add_edge(parent_idx, next_idx, link);
            }
        }
        Ok(())
    }

    /// Delete `id` and everything held in its slots. The stack it sat in is
    /// healed. Returns the ids of every deleted block.
    pub fn remove(&mut self, id: BlockId) -> Result<Vec<BlockId>, EngineError> {
        self.detach(id, true)?;
        let idx = self.index(id)?;
        if let Some((edge, _)) = self.next_edge(idx) {
            self.graph.remove_edge(edge);
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            cursor += 1;
            let Some(&current_idx) = self.node_indices.get(&current) else {
                continue;
            };
            let heads: Vec<BlockId> = self
                .graph
                .edges_directed(current_idx, Direction::Outgoing)
                .filter(|e| matches!(e.weight(), Link::Slot(_)))
                .map(|e| self.graph[e.target()].id)
                .collect();
            for head in heads {
                doomed.extend(self.chain(Some(head)));
            }
        }

        for block in &doomed {
            if let Some(idx) = self.node_indices.remove(block) {
                self.graph.remove_node(idx);
            }
        }
        Ok(doomed)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn index(&self, id: BlockId) -> Result<NodeIndex, EngineError> {
        self.node_indices
            .get(&id)
            .copied()
            .ok_or_else(|| unknown_block(id))
    }

    fn next_edge(&self, idx: NodeIndex) -> Option<(EdgeIndex, NodeIndex)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .find(|e| *e.weight() == Link::Next)
            .map(|e| (e.id(), e.target()))
    }

    fn slot_edge(&self, idx: NodeIndex, slot: &str) -> Option<(EdgeIndex, NodeIndex)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .find(|e| matches!(e.weight(), Link::Slot(name) if name == slot))
            .map(|e| (e.id(), e.target()))
    }

    fn ensure_movable(&self, id: BlockId) -> Result<(), EngineError> {
        if id == self.root {
            return Err(EngineError::graph(
                "G003",
                "The Script root cannot be moved or deleted",
                Some(id),
            ));
        }
        self.index(id).map(|_| ())
    }

    fn ensure_compatible(&self, accepts: &StatementTag, child: BlockId) -> Result<(), EngineError> {
        let tag = self.block(child)?.kind.statement_tag();
        if tag.as_ref() != Some(accepts) {
            return Err(EngineError::graph(
                "G004",
                format!(
                    "Connection expects '{}' but block provides '{}'",
                    accepts,
                    tag.map(|t| t.to_string()).unwrap_or_else(|| "nothing".into())
                ),
                Some(child),
            ));
        }
        Ok(())
    }

    /// Moving `child` under `target` must not place it inside its own stack or slots.
    fn ensure_acyclic(&self, child: BlockId, target: BlockId) -> Result<(), EngineError> {
        if self.is_ancestor(child, target) {
            return Err(EngineError::graph(
                "G005",
                "Connection would place a block inside itself",
                Some(child),
            ));
        }
        Ok(())
    }
}

fn unknown_block(id: BlockId) -> EngineError {
    EngineError::graph("G002", format!("Unknown block '{}'", id), Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_slots() -> Vec<SlotSpec> {
        vec![
            SlotSpec {
                name: slots::OPTIONS.into(),
                accepts: StatementTag::Option("ls".into()),
            },
            SlotSpec {
                name: slots::OPERANDS.into(),
                accepts: StatementTag::Operand("ls".into()),
            },
        ]
    }

    fn add_command(graph: &mut BlockGraph) -> BlockId {
        graph.insert(BlockKind::command("ls"), command_slots(), BTreeMap::new())
    }

    fn add_option(graph: &mut BlockGraph) -> BlockId {
        graph.insert(BlockKind::option("ls"), vec![], BTreeMap::new())
    }

    #[test]
    fn attach_pushes_existing_chain_below_new_stack() {
        let mut graph = BlockGraph::new();
        let root = graph.root();
        let a = add_command(&mut graph);
        let b = add_command(&mut graph);
        graph.attach_to_slot(root, slots::STACK, a).unwrap();
        graph.attach_to_slot(root, slots::STACK, b).unwrap();
        assert_eq!(graph.slot_chain(root, slots::STACK), vec![b, a]);
    }

    #[test]
    fn insert_after_keeps_following_siblings() {
        let mut graph = BlockGraph::new();
        let cmd = add_command(&mut graph);
        let o1 = add_option(&mut graph);
        let o2 = add_option(&mut graph);
        let o3 = add_option(&mut graph);
        graph.attach_to_slot(cmd, slots::OPTIONS, o1).unwrap();
        graph.insert_after(o1, o3).unwrap();
        graph.insert_after(o1, o2).unwrap();
        assert_eq!(graph.slot_chain(cmd, slots::OPTIONS), vec![o1, o2, o3]);
    }

    #[test]
    fn healing_detach_closes_the_gap() {
        let mut graph = BlockGraph::new();
        let cmd = add_command(&mut graph);
        let o1 = add_option(&mut graph);
        let o2 = add_option(&mut graph);
        let o3 = add_option(&mut graph);
        graph.attach_to_slot(cmd, slots::OPTIONS, o1).unwrap();
        graph.insert_after(o1, o2).unwrap();
        graph.insert_after(o2, o3).unwrap();

        graph.detach(o2, true).unwrap();
        assert_eq!(graph.slot_chain(cmd, slots::OPTIONS), vec![o1, o3]);
        assert_eq!(graph.parent(o2), None);
        assert_eq!(graph.next(o2), None);

        graph.detach(o1, false).unwrap();
        assert!(graph.slot_chain(cmd, slots::OPTIONS).is_empty());
        assert_eq!(graph.chain(Some(o1)), vec![o1, o3]);
    }

    #[test]
    fn incompatible_and_cyclic_connections_are_rejected() {
        let mut graph = BlockGraph::new();
        let root = graph.root();
        let cmd = add_command(&mut graph);
        let opt = add_option(&mut graph);

        let err = graph.attach_to_slot(root, slots::STACK, opt).unwrap_err();
        assert_eq!(err.code, "G004");

        let err = graph.attach_to_slot(cmd, slots::STACK, opt).unwrap_err();
        assert_eq!(err.code, "G006");

        let err = graph.insert_after(cmd, cmd).unwrap_err();
        assert_eq!(err.code, "G005");

        let err = graph.detach(root, true).unwrap_err();
        assert_eq!(err.code, "G003");
    }

    #[test]
    fn remove_deletes_slot_contents_and_heals_stack() {
        let mut graph = BlockGraph::new();
        let root = graph.root();
        let a = add_command(&mut graph);
        let b = add_command(&mut graph);
        let opt = add_option(&mut graph);
        graph.attach_to_slot(root, slots::STACK, b).unwrap();
        graph.attach_to_slot(root, slots::STACK, a).unwrap();
        graph.attach_to_slot(a, slots::OPTIONS, opt).unwrap();

        let removed = graph.remove(a).unwrap();
        assert_eq!(removed, vec![a, opt]);
        assert!(!graph.contains(opt));
        assert_eq!(graph.slot_chain(root, slots::STACK), vec![b]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn surround_parent_walks_up_the_chain() {
        let mut graph = BlockGraph::new();
        let cmd = add_command(&mut graph);
        let o1 = add_option(&mut graph);
        let o2 = add_option(&mut graph);
        graph.attach_to_slot(cmd, slots::OPTIONS, o1).unwrap();
        graph.insert_after(o1, o2).unwrap();
        assert_eq!(graph.surround_parent(o2), Some((cmd, slots::OPTIONS.to_string())));
        assert_eq!(graph.root_of(o2), cmd);
    }
}
