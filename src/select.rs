//! Node and relationship selection strategies.
//!
//! Both default strategies sample uniformly from the eligible candidate set with a
//! single reservoir pass, so the order a store enumerates in does not bias the
//! choice.

use crate::filter::{IncludeAll, NodeFilter, RelationshipFilter};
use crate::graph::{GraphStore, Node, NodeId, Relationship};
use crate::{Error, Result};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Picks the node a walk (re)starts from.
pub trait NodeSelector {
    /// `Ok(None)` when no node is eligible.
    fn select_node<G, R>(&self, graph: &G, rng: &mut R) -> Result<Option<Node>>
    where
        G: GraphStore + ?Sized,
        R: Rng;
}

/// Picks the relationship a walk follows out of its current node.
pub trait RelationshipSelector {
    /// `Ok(None)` when `node` is a dead end.
    fn select_relationship<G, R>(
        &self,
        graph: &G,
        node: &Node,
        rng: &mut R,
    ) -> Result<Option<Relationship>>
    where
        G: GraphStore + ?Sized,
        R: Rng;
}

#[derive(Clone)]
pub struct RandomNodeSelector {
    node_filter: Arc<dyn NodeFilter>,
}

impl RandomNodeSelector {
    pub fn new(node_filter: Arc<dyn NodeFilter>) -> Self {
        Self { node_filter }
    }

    /// Ids of every node the filter admits, in store order.
    pub fn eligible_nodes<G: GraphStore + ?Sized>(&self, graph: &G) -> Result<Vec<NodeId>> {
        Ok(graph
            .nodes()?
            .into_iter()
            .filter(|n| self.node_filter.includes(n))
            .map(|n| n.id)
            .collect())
    }
}

impl Default for RandomNodeSelector {
    fn default() -> Self {
        Self::new(Arc::new(IncludeAll))
    }
}

impl fmt::Debug for RandomNodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomNodeSelector").finish_non_exhaustive()
    }
}

impl NodeSelector for RandomNodeSelector {
    fn select_node<G, R>(&self, graph: &G, rng: &mut R) -> Result<Option<Node>>
    where
        G: GraphStore + ?Sized,
        R: Rng,
    {
        Ok(graph
            .nodes()?
            .into_iter()
            .filter(|n| self.node_filter.includes(n))
            .choose(rng))
    }
}

#[derive(Clone)]
pub struct RandomRelationshipSelector {
    relationship_filter: Arc<dyn RelationshipFilter>,
    node_filter: Arc<dyn NodeFilter>,
}

impl RandomRelationshipSelector {
    pub fn new(
        relationship_filter: Arc<dyn RelationshipFilter>,
        node_filter: Arc<dyn NodeFilter>,
    ) -> Self {
        Self { relationship_filter, node_filter }
    }

    /// Every outgoing relationship of `node` the walk may follow, in store order.
    pub fn eligible_relationships<G: GraphStore + ?Sized>(
        &self,
        graph: &G,
        node: &Node,
    ) -> Result<Vec<Relationship>> {
        let mut eligible = Vec::new();
        for rel in graph.outgoing(node.id)? {
            if self.is_eligible(graph, node, &rel)? {
                eligible.push(rel);
            }
        }
        Ok(eligible)
    }

    fn is_eligible<G: GraphStore + ?Sized>(
        &self,
        graph: &G,
        node: &Node,
        rel: &Relationship,
    ) -> Result<bool> {
        if rel.source != node.id || !self.relationship_filter.includes(rel) {
            return Ok(false);
        }
        let other = rel.other_node(node.id);
        if other == node.id {
            return Ok(self.node_filter.includes(node));
        }
        match graph.node(other) {
            Ok(target) => Ok(self.node_filter.includes(&target)),
            // Deleted since `outgoing` was snapshotted.
            Err(Error::NodeNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Default for RandomRelationshipSelector {
    fn default() -> Self {
        Self::new(Arc::new(IncludeAll), Arc::new(IncludeAll))
    }
}

impl fmt::Debug for RandomRelationshipSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomRelationshipSelector").finish_non_exhaustive()
    }
}

impl RelationshipSelector for RandomRelationshipSelector {
    fn select_relationship<G, R>(
        &self,
        graph: &G,
        node: &Node,
        rng: &mut R,
    ) -> Result<Option<Relationship>>
    where
        G: GraphStore + ?Sized,
        R: Rng,
    {
        // Reservoir sampling by hand: `is_eligible` can fail, which rules out
        // `IteratorRandom::choose`.
        let mut chosen = None;
        let mut seen = 0usize;
        for rel in graph.outgoing(node.id)? {
            if !self.is_eligible(graph, node, &rel)? {
                continue;
            }
            seen += 1;
            if rng.random_range(0..seen) == 0 {
                chosen = Some(rel);
            }
        }
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{KindFilter, LabelFilter};
    use crate::memory::MemoryGraph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn empty_graph_selects_nothing() {
        let g = MemoryGraph::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(RandomNodeSelector::default().select_node(&g, &mut rng).unwrap().is_none());
    }

    #[test]
    fn node_selection_is_roughly_uniform() {
        let g = MemoryGraph::new();
        for _ in 0..4 {
            g.add_node(["N"]);
        }
        let sel = RandomNodeSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut counts: HashMap<NodeId, usize> = HashMap::new();
        let trials = 8_000;
        for _ in 0..trials {
            let n = sel.select_node(&g, &mut rng).unwrap().unwrap();
            *counts.entry(n.id).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        for (&id, &c) in &counts {
            // Expected 2000 each; a 15% band is far outside sampling noise.
            assert!((1700..=2300).contains(&c), "node {id} picked {c} times");
        }
    }

    #[test]
    fn node_filter_excludes_absolutely() {
        let g = MemoryGraph::new();
        let person = g.add_node(["Person"]);
        g.add_node(["City"]);
        g.add_node(["City"]);
        let sel = RandomNodeSelector::new(Arc::new(LabelFilter::new(["Person"])));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(sel.select_node(&g, &mut rng).unwrap().unwrap().id, person);
        }
        assert_eq!(sel.eligible_nodes(&g).unwrap(), vec![person]);
    }

    #[test]
    fn dead_end_is_deterministic() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        let b = g.add_node(["B"]);
        g.add_relationship(b, a, "LINK").unwrap();
        let node = g.node(a).unwrap();
        let sel = RandomRelationshipSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(sel.select_relationship(&g, &node, &mut rng).unwrap().is_none());
        }
    }

    #[test]
    fn relationship_into_excluded_node_is_ineligible() {
        let g = MemoryGraph::new();
        let a = g.add_node(["Page"]);
        let b = g.add_node(["Page"]);
        let hidden = g.add_node(["Hidden"]);
        g.add_relationship(a, b, "LINK").unwrap();
        g.add_relationship(a, hidden, "LINK").unwrap();

        let sel = RandomRelationshipSelector::new(
            Arc::new(IncludeAll),
            Arc::new(LabelFilter::new(["Page"])),
        );
        let node = g.node(a).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let rel = sel.select_relationship(&g, &node, &mut rng).unwrap().unwrap();
            assert_eq!(rel.target, b);
        }
    }

    #[test]
    fn relationship_filter_applies_by_kind() {
        let g = MemoryGraph::new();
        let a = g.add_node(["N"]);
        let b = g.add_node(["N"]);
        let c = g.add_node(["N"]);
        g.add_relationship(a, b, "FOLLOWS").unwrap();
        g.add_relationship(a, c, "BLOCKS").unwrap();

        let sel = RandomRelationshipSelector::new(
            Arc::new(KindFilter::new(["FOLLOWS"])),
            Arc::new(IncludeAll),
        );
        let node = g.node(a).unwrap();
        let eligible = sel.eligible_relationships(&g, &node).unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].target, b);
    }

    #[test]
    fn relationship_selection_covers_parallel_edges_uniformly() {
        let g = MemoryGraph::new();
        let a = g.add_node(["N"]);
        let b = g.add_node(["N"]);
        let c = g.add_node(["N"]);
        // Two parallel edges to b, one to c: b should win about 2/3 of the time.
        g.add_relationship(a, b, "LINK").unwrap();
        g.add_relationship(a, b, "LINK").unwrap();
        g.add_relationship(a, c, "LINK").unwrap();

        let sel = RandomRelationshipSelector::default();
        let node = g.node(a).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let trials = 6_000;
        let mut to_b = 0;
        for _ in 0..trials {
            if sel.select_relationship(&g, &node, &mut rng).unwrap().unwrap().target == b {
                to_b += 1;
            }
        }
        assert!((3600..=4400).contains(&to_b), "to_b={to_b}");
    }

    #[test]
    fn self_loop_respects_node_filter_of_current_node() {
        let g = MemoryGraph::new();
        let a = g.add_node(["Page"]);
        g.add_relationship(a, a, "SELF").unwrap();
        let node = g.node(a).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let open = RandomRelationshipSelector::default();
        assert_eq!(open.select_relationship(&g, &node, &mut rng).unwrap().unwrap().target, a);

        let closed = RandomRelationshipSelector::new(
            Arc::new(IncludeAll),
            Arc::new(LabelFilter::new(["Other"])),
        );
        assert!(closed.select_relationship(&g, &node, &mut rng).unwrap().is_none());
    }
}
