//! Walk configuration.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeRankConfig {
    /// Seed for the walker's RNG.
    pub seed: u64,
    /// How many of the highest-ranked nodes to track; 0 disables tracking.
    pub max_top_rank_nodes: usize,
}

impl Default for NodeRankConfig {
    fn default() -> Self {
        Self { seed: 42, max_top_rank_nodes: 10 }
    }
}

impl NodeRankConfig {
    /// Upper bound on the tracked top set; it is kept sorted on every visit.
    pub const MAX_TOP_RANK_NODES: usize = 10_000;

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_top_rank_nodes(mut self, max_top_rank_nodes: usize) -> Self {
        self.max_top_rank_nodes = max_top_rank_nodes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_top_rank_nodes > Self::MAX_TOP_RANK_NODES {
            return Err(Error::InvalidParameter(format!(
                "max_top_rank_nodes must be <= {}",
                Self::MAX_TOP_RANK_NODES
            )));
        }
        Ok(())
    }
}
