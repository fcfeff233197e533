//! Orphan detection: a block is enabled iff it is reachable from the Script root.

use std::collections::HashSet;

use petgraph::visit::Bfs;

use super::block_graph::BlockGraph;

/// Recompute `enabled` for every block. Returns how many flags changed.
pub fn refresh(graph: &mut BlockGraph) -> usize {
    let root = graph.root();
    let Some(&root_idx) = graph.node_indices.get(&root) else {
        return 0;
    };

    let mut reachable = HashSet::new();
    let mut bfs = Bfs::new(&graph.graph, root_idx);
    while let Some(nx) = bfs.next(&graph.graph) {
        reachable.insert(nx);
    }

    let mut changed = 0;
    let indices: Vec<_> = graph.node_indices.values().copied().collect();
    for idx in indices {
        let enabled = reachable.contains(&idx);
        let block = &mut graph.graph[idx];
        if block.enabled != enabled {
            block.enabled = enabled;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::graph::types::*;

    #[test]
    fn enabled_matches_topmost_ancestor() {
        let mut graph = BlockGraph::new();
        let root = graph.root();
        let slots = vec![SlotSpec {
            name: slots::OPTIONS.into(),
            accepts: StatementTag::Option("ls".into()),
        }];
        let attached = graph.insert(BlockKind::command("ls"), slots.clone(), BTreeMap::new());
        let loose = graph.insert(BlockKind::command("ls"), slots, BTreeMap::new());
        let opt = graph.insert(BlockKind::option("ls"), vec![], BTreeMap::new());
        graph.attach_to_slot(root, slots::STACK, attached).unwrap();
        graph.attach_to_slot(loose, slots::OPTIONS, opt).unwrap();

        assert_eq!(refresh(&mut graph), 1);
        for id in graph.ids() {
            let block = graph.get(id).unwrap();
            assert_eq!(block.enabled, graph.root_of(id) == root, "block {}", id);
        }

        graph.detach(attached, false).unwrap();
        assert_eq!(refresh(&mut graph), 1);
        assert!(!graph.get(attached).unwrap().enabled);
        assert!(graph.get(root).unwrap().enabled);
        assert_eq!(refresh(&mut graph), 0);
    }
}
