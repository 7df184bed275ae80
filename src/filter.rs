//! Inclusion filters.
//!
//! Filters decide which nodes and relationships a walk may use. They are shared
//! read-only by every selection call, so implementations must be stateless (or at
//! least `Sync`).

use crate::graph::{Node, Relationship};
use std::collections::HashSet;

pub trait NodeFilter: Send + Sync {
    fn includes(&self, node: &Node) -> bool;
}

pub trait RelationshipFilter: Send + Sync {
    fn includes(&self, relationship: &Relationship) -> bool;
}

/// Includes every node and every relationship. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl NodeFilter for IncludeAll {
    fn includes(&self, _node: &Node) -> bool {
        true
    }
}

impl RelationshipFilter for IncludeAll {
    fn includes(&self, _relationship: &Relationship) -> bool {
        true
    }
}

impl<F> NodeFilter for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn includes(&self, node: &Node) -> bool {
        self(node)
    }
}

impl<F> RelationshipFilter for F
where
    F: Fn(&Relationship) -> bool + Send + Sync,
{
    fn includes(&self, relationship: &Relationship) -> bool {
        self(relationship)
    }
}

/// Includes nodes carrying at least one of the given labels.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    labels: HashSet<String>,
}

impl LabelFilter {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { labels: labels.into_iter().map(Into::into).collect() }
    }
}

impl NodeFilter for LabelFilter {
    fn includes(&self, node: &Node) -> bool {
        node.labels.iter().any(|l| self.labels.contains(l))
    }
}

/// Includes relationships whose kind is one of the given kinds.
#[derive(Debug, Clone, Default)]
pub struct KindFilter {
    kinds: HashSet<String>,
}

impl KindFilter {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { kinds: kinds.into_iter().map(Into::into).collect() }
    }
}

impl RelationshipFilter for KindFilter {
    fn includes(&self, relationship: &Relationship) -> bool {
        self.kinds.contains(&relationship.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, labels: &[&str]) -> Node {
        Node { id, labels: labels.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn label_filter_matches_any_label() {
        let f = LabelFilter::new(["Person", "Company"]);
        assert!(f.includes(&node(0, &["Person"])));
        assert!(f.includes(&node(1, &["City", "Company"])));
        assert!(!f.includes(&node(2, &["City"])));
        assert!(!f.includes(&node(3, &[])));
    }

    #[test]
    fn kind_filter_matches_exact_kind() {
        let f = KindFilter::new(["FRIEND_OF"]);
        let r = |kind: &str| Relationship { id: 0, source: 0, target: 1, kind: kind.into() };
        assert!(f.includes(&r("FRIEND_OF")));
        assert!(!f.includes(&r("friend_of")));
        assert!(!f.includes(&r("WORKS_AT")));
    }

    #[test]
    fn closures_are_filters() {
        let even = |n: &Node| n.id % 2 == 0;
        assert!(NodeFilter::includes(&even, &node(4, &[])));
        assert!(!NodeFilter::includes(&even, &node(5, &[])));
        assert!(NodeFilter::includes(&IncludeAll, &node(5, &[])));
    }
}
