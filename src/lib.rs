//! `noderank`: perpetual random-walk node ranking.
//!
//! A walker takes one step per scheduled tick: it resumes from the node it last
//! visited, follows a uniformly-random eligible outgoing relationship, and bumps
//! the `rank` counter of the node it arrives at. Over time the counters approach
//! (unnormalized) PageRank scores for the graph.
//!
//! Public invariants (must not drift):
//! - **Uniform selection**: node and relationship selection are uniform over the
//!   eligible candidate set, independent of store iteration order.
//! - **Exclusion is absolute**: a node or relationship rejected by a filter is
//!   never selected, and a relationship leading to an excluded node is itself
//!   ineligible.
//! - **No lost updates**: rank increments are atomic per node.
//! - **No silent normalization**: ranks are raw visit counts.
//! - **Graceful degradation**: dead ends, empty candidate sets and vanished resume
//!   points are logged and surface as `Ok(None)`; only store failures are `Err`.
//!
//! Swappable (allowed to change without breaking the contract):
//! - selector strategies (anything implementing [`NodeSelector`] /
//!   [`RelationshipSelector`])
//! - the store backing the walk (anything implementing [`GraphStore`])

pub mod config;
pub mod engine;
pub mod filter;
pub mod graph;
pub mod memory;
#[cfg(feature = "parallel")]
pub mod pool;
pub mod select;
pub mod state;
pub mod topk;
pub mod walker;

pub use config::NodeRankConfig;
pub use engine::{StepEvent, TickModule, WalkEngine, WalkStats};
pub use filter::{IncludeAll, KindFilter, LabelFilter, NodeFilter, RelationshipFilter};
pub use graph::{GraphStore, Node, NodeId, Relationship, RelationshipId};
pub use memory::MemoryGraph;
#[cfg(feature = "parallel")]
pub use pool::WalkerPool;
pub use select::{
    NodeSelector, RandomNodeSelector, RandomRelationshipSelector, RelationshipSelector,
};
pub use state::WalkState;
pub use topk::{top_k, TopRankedNodes};
pub use walker::Walker;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid walk state token: {0}")]
    InvalidToken(String),
    #[error("graph store failure: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
