//! Ranking utilities.

use crate::graph::{GraphStore, NodeId};
use crate::Result;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// The `k` highest-ranked `(node, rank)` pairs, best first.
///
/// Zero ranks are skipped; ties are broken by the smaller node id.
pub fn top_k(ranks: &[(NodeId, u64)], k: usize) -> Vec<(NodeId, u64)> {
    if k == 0 || ranks.is_empty() {
        return Vec::new();
    }
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for &(node, rank) in ranks {
        if rank == 0 {
            continue;
        }
        // Min-heap on (rank, Reverse(node)) keeps the k best.
        let key = (rank, Reverse(node));
        if heap.len() < k {
            heap.push(Reverse(key));
        } else if let Some(&Reverse(min)) = heap.peek() {
            if key > min {
                heap.pop();
                heap.push(Reverse(key));
            }
        }
    }
    let mut results: Vec<(NodeId, u64)> = heap
        .into_iter()
        .map(|Reverse((rank, Reverse(node)))| (node, rank))
        .collect();
    results.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    results
}

/// Bounded, incrementally maintained set of the highest-ranked nodes.
///
/// The walk offers every node it increments. Entries are never evicted for
/// going stale on their own; call [`TopRankedNodes::retain_existing`] to drop
/// deleted nodes.
///
/// Each engine tracks only its own increments: when several walkers share a
/// store, a recorded rank is the value this walker last saw and may lag the store.
#[derive(Debug, Clone, Default)]
pub struct TopRankedNodes {
    capacity: usize,
    // Sorted by rank descending, then node id ascending.
    entries: Vec<(NodeId, u64)>,
}

impl TopRankedNodes {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Vec::with_capacity(capacity) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn offer(&mut self, node: NodeId, rank: u64) {
        if self.capacity == 0 {
            return;
        }
        if let Some(pos) = self.entries.iter().position(|&(n, _)| n == node) {
            self.entries.remove(pos);
        } else if self.entries.len() == self.capacity {
            let beats_last = self
                .entries
                .last()
                .is_some_and(|&(n, r)| (rank, Reverse(node)) > (r, Reverse(n)));
            if !beats_last {
                return;
            }
            self.entries.pop();
        }
        let at = self
            .entries
            .partition_point(|&(n, r)| (r, Reverse(n)) > (rank, Reverse(node)));
        self.entries.insert(at, (node, rank));
    }

    pub fn top(&self) -> &[(NodeId, u64)] {
        &self.entries
    }

    pub fn retain_existing<G: GraphStore + ?Sized>(&mut self, graph: &G) -> Result<()> {
        let mut kept = Vec::with_capacity(self.entries.len());
        for &(node, rank) in &self.entries {
            if graph.contains_node(node)? {
                kept.push((node, rank));
            }
        }
        self.entries = kept;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
