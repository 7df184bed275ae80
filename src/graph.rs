//! Graph store adapter traits.
//!
//! The walk never owns the graph. It reads topology and the per-node rank counter
//! through [`GraphStore`], which any host store can implement.

use crate::{Error, Result};

pub type NodeId = u64;
pub type RelationshipId = u64;

/// Snapshot of a node as seen by filters and selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub labels: Vec<String>,
}

impl Node {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A directed relationship `source -> target` with a type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relationship {
    pub id: RelationshipId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: String,
}

impl Relationship {
    /// The endpoint opposite to `node`.
    ///
    /// For a self-loop both endpoints are `node`.
    pub fn other_node(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// A mutable directed multigraph the walk can traverse and annotate.
///
/// Requirements:
/// - all methods take `&self` and must tolerate concurrent callers;
/// - `node` returns [`Error::NodeNotFound`] for ids that do not (or no longer) exist;
/// - `nodes` and `outgoing` return a snapshot; it need not reflect writes that race
///   with the call;
/// - `outgoing(id)` only returns relationships whose `source == id`;
/// - `compare_and_set_rank` is atomic per node.
///
/// Any other failure is reported as [`Error::Store`] and is propagated untouched by
/// the walk.
pub trait GraphStore {
    fn node(&self, id: NodeId) -> Result<Node>;

    fn nodes(&self) -> Result<Vec<Node>>;

    fn outgoing(&self, id: NodeId) -> Result<Vec<Relationship>>;

    /// Current rank of a node; nodes that were never visited have rank 0.
    fn rank(&self, id: NodeId) -> Result<u64>;

    /// Set the rank to `new` iff it currently equals `current`.
    fn compare_and_set_rank(&self, id: NodeId, current: u64, new: u64) -> Result<bool>;

    /// Atomically add one to a node's rank and return the new value.
    ///
    /// The default is a compare-and-swap retry loop; stores with a native atomic
    /// add should override it.
    fn increment_rank(&self, id: NodeId) -> Result<u64> {
        loop {
            let current = self.rank(id)?;
            let next = current.saturating_add(1);
            if self.compare_and_set_rank(id, current, next)? {
                return Ok(next);
            }
        }
    }

    fn contains_node(&self, id: NodeId) -> Result<bool> {
        match self.node(id) {
            Ok(_) => Ok(true),
            Err(Error::NodeNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: GraphStore + ?Sized> GraphStore for &S {
    fn node(&self, id: NodeId) -> Result<Node> {
        (**self).node(id)
    }
    fn nodes(&self) -> Result<Vec<Node>> {
        (**self).nodes()
    }
    fn outgoing(&self, id: NodeId) -> Result<Vec<Relationship>> {
        (**self).outgoing(id)
    }
    fn rank(&self, id: NodeId) -> Result<u64> {
        (**self).rank(id)
    }
    fn compare_and_set_rank(&self, id: NodeId, current: u64, new: u64) -> Result<bool> {
        (**self).compare_and_set_rank(id, current, new)
    }
    fn increment_rank(&self, id: NodeId) -> Result<u64> {
        (**self).increment_rank(id)
    }
    fn contains_node(&self, id: NodeId) -> Result<bool> {
        (**self).contains_node(id)
    }
}
