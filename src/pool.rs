//! Many independent walkers over one shared store.

use crate::config::NodeRankConfig;
use crate::engine::{StepEvent, WalkEngine, WalkStats};
use crate::filter::{IncludeAll, NodeFilter, RelationshipFilter};
use crate::graph::GraphStore;
use crate::state::WalkState;
use crate::walker::Walker;
use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// Steps a fixed set of walkers in parallel, one step each per tick.
///
/// Walker `i` is seeded with `config.seed + i`, so walkers never share an RNG
/// stream. Rank updates go through [`GraphStore::increment_rank`], which is
/// atomic per node.
#[derive(Debug)]
pub struct WalkerPool {
    walkers: Vec<Walker>,
}

impl WalkerPool {
    pub fn new(config: NodeRankConfig, walkers: usize) -> Result<Self> {
        Self::with_filters(config, walkers, Arc::new(IncludeAll), Arc::new(IncludeAll))
    }

    pub fn with_filters(
        config: NodeRankConfig,
        walkers: usize,
        node_filter: Arc<dyn NodeFilter>,
        relationship_filter: Arc<dyn RelationshipFilter>,
    ) -> Result<Self> {
        if walkers == 0 {
            return Err(Error::InvalidParameter("walkers must be > 0".to_string()));
        }
        let walkers = (0..walkers as u64)
            .map(|i| {
                let cfg = config.with_seed(config.seed.wrapping_add(i));
                WalkEngine::with_filters(cfg, node_filter.clone(), relationship_filter.clone())
                    .map(Walker::new)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { walkers })
    }

    pub fn len(&self) -> usize {
        self.walkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walkers.is_empty()
    }

    /// One tick for every walker. Returns each walker's event, in walker order.
    pub fn tick<G>(&mut self, graph: &G) -> Result<Vec<StepEvent>>
    where
        G: GraphStore + Sync + ?Sized,
    {
        self.walkers.par_iter_mut().map(|w| w.tick(graph)).collect()
    }

    pub fn run<G>(&mut self, graph: &G, ticks: usize) -> Result<()>
    where
        G: GraphStore + Sync + ?Sized,
    {
        for _ in 0..ticks {
            self.tick(graph)?;
        }
        Ok(())
    }

    pub fn states(&self) -> Vec<Option<WalkState>> {
        self.walkers.iter().map(Walker::state).collect()
    }

    /// Stats summed over all walkers.
    pub fn stats(&self) -> WalkStats {
        let mut total = WalkStats::default();
        for w in &self.walkers {
            total.merge(&w.engine().stats());
        }
        total
    }
}
