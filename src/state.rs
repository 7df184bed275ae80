//! The resumable cursor of a walk.

use crate::graph::{GraphStore, Node, NodeId};
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The node a walk last arrived at.
///
/// This is a lookup key, not a handle: the node may be deleted between ticks, in
/// which case [`WalkState::resolve`] reports [`Error::NodeNotFound`].
///
/// The persisted form (`Display` / `FromStr`, or serde with the `serde` feature)
/// is the decimal node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WalkState(NodeId);

impl WalkState {
    pub fn new(node: NodeId) -> Self {
        Self(node)
    }

    pub fn node_id(&self) -> NodeId {
        self.0
    }

    pub fn resolve<G: GraphStore + ?Sized>(&self, graph: &G) -> Result<Node> {
        graph.node(self.0)
    }
}

impl From<NodeId> for WalkState {
    fn from(node: NodeId) -> Self {
        Self(node)
    }
}

impl From<&Node> for WalkState {
    fn from(node: &Node) -> Self {
        Self(node.id)
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalkState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<NodeId>()
            .map(Self)
            .map_err(|e| Error::InvalidToken(format!("{s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;

    #[test]
    fn resolve_finds_live_node_and_reports_deleted_one() {
        let g = MemoryGraph::new();
        let a = g.add_node(["Page"]);
        let state = WalkState::new(a);
        assert_eq!(state.resolve(&g).unwrap().id, a);

        g.remove_node(a).unwrap();
        assert!(matches!(state.resolve(&g), Err(Error::NodeNotFound(id)) if id == a));
    }

    #[test]
    fn token_parses_back() {
        let state = WalkState::new(42);
        let token = state.to_string();
        assert_eq!(token, "42");
        assert_eq!(token.parse::<WalkState>().unwrap(), state);
        assert_eq!(" 42\n".parse::<WalkState>().unwrap(), state);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_form_is_the_bare_id() {
        let json = serde_json::to_string(&WalkState::new(7)).unwrap();
        assert_eq!(json, "7");
        assert_eq!(serde_json::from_str::<WalkState>(&json).unwrap(), WalkState::new(7));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!("node-42".parse::<WalkState>(), Err(Error::InvalidToken(_))));
        assert!(matches!("".parse::<WalkState>(), Err(Error::InvalidToken(_))));
    }
}
