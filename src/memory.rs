//! In-memory graph store.
//!
//! Topology sits behind a single `RwLock`; each node's rank is an `AtomicU64`, so
//! rank updates only need the shared read lock and never block selection.
//! Ids are handed out from monotonically increasing counters and never reused.

use crate::graph::{GraphStore, Node, NodeId, Relationship, RelationshipId};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct NodeEntry {
    labels: Vec<String>,
    rank: AtomicU64,
    outgoing: Vec<RelationshipId>,
    incoming: Vec<RelationshipId>,
}

#[derive(Debug, Default)]
struct Inner {
    // BTreeMap keeps snapshots in id order, which keeps seeded walks reproducible.
    nodes: BTreeMap<NodeId, NodeEntry>,
    relationships: HashMap<RelationshipId, Relationship>,
}

#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: RwLock<Inner>,
    next_node_id: AtomicU64,
    next_relationship_id: AtomicU64,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node<I, S>(&self, labels: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.next_node_id.fetch_add(1, Ordering::Relaxed);
        let entry = NodeEntry {
            labels: labels.into_iter().map(Into::into).collect(),
            rank: AtomicU64::new(0),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        };
        self.inner.write().nodes.insert(id, entry);
        id
    }

    /// Add a directed relationship `source -> target`.
    pub fn add_relationship(
        &self,
        source: NodeId,
        target: NodeId,
        kind: impl Into<String>,
    ) -> Result<RelationshipId> {
        let mut inner = self.inner.write();
        for endpoint in [source, target] {
            if !inner.nodes.contains_key(&endpoint) {
                return Err(Error::NodeNotFound(endpoint));
            }
        }
        let id = self.next_relationship_id.fetch_add(1, Ordering::Relaxed);
        inner
            .nodes
            .get_mut(&source)
            .ok_or(Error::NodeNotFound(source))?
            .outgoing
            .push(id);
        // Looked up again: `source` and `target` may be the same entry.
        if let Some(t) = inner.nodes.get_mut(&target) {
            t.incoming.push(id);
        }
        inner
            .relationships
            .insert(id, Relationship { id, source, target, kind: kind.into() });
        Ok(id)
    }

    /// Add `a -> b` and `b -> a`, so the walk can move either way.
    pub fn add_undirected(
        &self,
        a: NodeId,
        b: NodeId,
        kind: impl Into<String>,
    ) -> Result<(RelationshipId, RelationshipId)> {
        let kind = kind.into();
        let forward = self.add_relationship(a, b, kind.clone())?;
        let backward = self.add_relationship(b, a, kind)?;
        Ok((forward, backward))
    }

    /// Remove a node together with every relationship touching it.
    pub fn remove_node(&self, id: NodeId) -> Result<()> {
        let mut inner = self.inner.write();
        let entry = inner.nodes.remove(&id).ok_or(Error::NodeNotFound(id))?;
        for rel_id in entry.outgoing.iter().chain(entry.incoming.iter()) {
            if let Some(rel) = inner.relationships.remove(rel_id) {
                let other = rel.other_node(id);
                if let Some(o) = inner.nodes.get_mut(&other) {
                    o.outgoing.retain(|r| r != rel_id);
                    o.incoming.retain(|r| r != rel_id);
                }
            }
        }
        Ok(())
    }

    pub fn remove_relationship(&self, id: RelationshipId) -> Result<()> {
        let mut inner = self.inner.write();
        let rel = inner.relationships.remove(&id).ok_or(Error::RelationshipNotFound(id))?;
        if let Some(s) = inner.nodes.get_mut(&rel.source) {
            s.outgoing.retain(|r| *r != id);
        }
        if let Some(t) = inner.nodes.get_mut(&rel.target) {
            t.incoming.retain(|r| *r != id);
        }
        Ok(())
    }

    pub fn set_rank(&self, id: NodeId, rank: u64) -> Result<()> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        entry.rank.store(rank, Ordering::SeqCst);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.read().relationships.len()
    }

    /// Snapshot of `(node, rank)` pairs in id order.
    pub fn ranks(&self) -> Vec<(NodeId, u64)> {
        self.inner
            .read()
            .nodes
            .iter()
            .map(|(&id, e)| (id, e.rank.load(Ordering::SeqCst)))
            .collect()
    }

    pub fn total_rank(&self) -> u64 {
        self.inner
            .read()
            .nodes
            .values()
            .map(|e| e.rank.load(Ordering::SeqCst))
            .sum()
    }
}

impl GraphStore for MemoryGraph {
    fn node(&self, id: NodeId) -> Result<Node> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(Node { id, labels: entry.labels.clone() })
    }

    fn nodes(&self) -> Result<Vec<Node>> {
        Ok(self
            .inner
            .read()
            .nodes
            .iter()
            .map(|(&id, e)| Node { id, labels: e.labels.clone() })
            .collect())
    }

    fn outgoing(&self, id: NodeId) -> Result<Vec<Relationship>> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(entry
            .outgoing
            .iter()
            .filter_map(|r| inner.relationships.get(r).cloned())
            .collect())
    }

    fn rank(&self, id: NodeId) -> Result<u64> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(entry.rank.load(Ordering::SeqCst))
    }

    fn compare_and_set_rank(&self, id: NodeId, current: u64, new: u64) -> Result<bool> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(entry
            .rank
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok())
    }

    fn increment_rank(&self, id: NodeId) -> Result<u64> {
        let inner = self.inner.read();
        let entry = inner.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(entry.rank.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn contains_node(&self, id: NodeId) -> Result<bool> {
        Ok(self.inner.read().nodes.contains_key(&id))
    }
}

#[cfg(feature = "petgraph")]
impl MemoryGraph {
    /// Import the topology of a petgraph graph.
    ///
    /// Node ids follow `NodeIndex::index()`; every node gets `node_label` and every
    /// edge becomes a relationship of `kind`. Undirected graphs get both directions.
    pub fn from_petgraph<N, E, Ty, Ix>(
        graph: &petgraph::Graph<N, E, Ty, Ix>,
        node_label: &str,
        kind: &str,
    ) -> Result<Self>
    where
        Ty: petgraph::EdgeType,
        Ix: petgraph::graph::IndexType,
    {
        use petgraph::visit::EdgeRef;

        let store = Self::new();
        for _ in graph.node_indices() {
            store.add_node([node_label]);
        }
        for edge in graph.edge_references() {
            let (s, t) = (edge.source().index() as NodeId, edge.target().index() as NodeId);
            if graph.is_directed() {
                store.add_relationship(s, t, kind)?;
            } else {
                store.add_undirected(s, t, kind)?;
            }
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_is_directed() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        let b = g.add_node(["B"]);
        g.add_relationship(a, b, "LINK").unwrap();

        let out_a = g.outgoing(a).unwrap();
        assert_eq!(out_a.len(), 1);
        assert_eq!(out_a[0].target, b);
        assert!(g.outgoing(b).unwrap().is_empty());
    }

    #[test]
    fn relationship_to_missing_node_is_rejected() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        assert!(matches!(g.add_relationship(a, 99, "LINK"), Err(Error::NodeNotFound(99))));
        assert!(matches!(g.add_relationship(99, a, "LINK"), Err(Error::NodeNotFound(99))));
        assert_eq!(g.relationship_count(), 0);
    }

    #[test]
    fn remove_node_drops_incident_relationships() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        let b = g.add_node(["B"]);
        let c = g.add_node(["C"]);
        g.add_relationship(a, b, "LINK").unwrap();
        g.add_relationship(b, c, "LINK").unwrap();
        g.add_relationship(c, b, "LINK").unwrap();

        g.remove_node(b).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.relationship_count(), 0);
        assert!(g.outgoing(a).unwrap().is_empty());
        assert!(g.outgoing(c).unwrap().is_empty());
        assert!(matches!(g.node(b), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn self_loop_survives_and_is_removed_cleanly() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        let r = g.add_relationship(a, a, "SELF").unwrap();
        assert_eq!(g.outgoing(a).unwrap()[0].target, a);
        g.remove_relationship(r).unwrap();
        assert!(g.outgoing(a).unwrap().is_empty());
        assert!(matches!(g.remove_relationship(r), Err(Error::RelationshipNotFound(_))));
    }

    #[test]
    fn ids_are_not_reused() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        g.remove_node(a).unwrap();
        let b = g.add_node(["B"]);
        assert_ne!(a, b);
    }

    #[test]
    fn rank_defaults_to_zero_and_increments() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        assert_eq!(g.rank(a).unwrap(), 0);
        assert_eq!(g.increment_rank(a).unwrap(), 1);
        g.set_rank(a, 10).unwrap();
        assert_eq!(g.increment_rank(a).unwrap(), 11);
        assert!(g.compare_and_set_rank(a, 11, 20).unwrap());
        assert!(!g.compare_and_set_rank(a, 11, 30).unwrap());
        assert_eq!(g.rank(a).unwrap(), 20);
        assert_eq!(g.total_rank(), 20);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let g = MemoryGraph::new();
        let a = g.add_node(["A"]);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..500 {
                        g.increment_rank(a).unwrap();
                    }
                });
            }
        });
        assert_eq!(g.rank(a).unwrap(), 4000);
    }

    #[cfg(feature = "petgraph")]
    #[test]
    fn petgraph_import_keeps_topology() {
        use petgraph::prelude::*;

        let mut pg: DiGraph<(), ()> = DiGraph::new();
        let a = pg.add_node(());
        let b = pg.add_node(());
        let c = pg.add_node(());
        pg.add_edge(a, b, ());
        pg.add_edge(b, c, ());

        let g = MemoryGraph::from_petgraph(&pg, "Page", "LINKS_TO").unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.relationship_count(), 2);
        assert_eq!(g.outgoing(0).unwrap()[0].target, 1);
        assert!(g.outgoing(2).unwrap().is_empty());
        assert!(g.node(1).unwrap().has_label("Page"));

        let mut ug: UnGraph<(), ()> = UnGraph::new_undirected();
        let x = ug.add_node(());
        let y = ug.add_node(());
        ug.add_edge(x, y, ());
        let g = MemoryGraph::from_petgraph(&ug, "Page", "LINKS_TO").unwrap();
        assert_eq!(g.relationship_count(), 2);
    }
}
