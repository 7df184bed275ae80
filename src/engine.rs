//! The per-tick walk state machine.
//!
//! One call to [`WalkEngine::step`] is one tick:
//!
//! | previous | resolve   | next node from       | success                  | otherwise        |
//! |----------|-----------|----------------------|--------------------------|------------------|
//! | `None`   | n/a       | node selector        | new state, no increment  | `None`, warn     |
//! | `Some`   | found     | relationship selector| increment + new state    | `None` (dead end)|
//! | `Some`   | not found | node selector        | increment + new state    | `None`, warn     |
//!
//! Dead ends, empty candidate sets and vanished nodes are expected and never
//! surface as errors; only store failures do.

use crate::config::NodeRankConfig;
use crate::filter::{IncludeAll, NodeFilter, RelationshipFilter};
use crate::graph::{GraphStore, Node, NodeId};
use crate::select::{
    NodeSelector, RandomNodeSelector, RandomRelationshipSelector, RelationshipSelector,
};
use crate::state::WalkState;
use crate::topk::TopRankedNodes;
use crate::{Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The capability a host scheduler drives: seed once, then step every tick.
pub trait TickModule<G: GraphStore + ?Sized> {
    type State;

    fn initialize(&mut self, graph: &G) -> Result<Option<Self::State>>;

    fn step(&mut self, previous: Option<Self::State>, graph: &G) -> Result<Option<Self::State>>;

    fn shutdown(&mut self) {}
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepEvent {
    /// A start node was chosen; nothing was incremented.
    Started(NodeId),
    /// A relationship was followed and the arrived-at node incremented.
    Advanced { from: NodeId, to: NodeId },
    /// The previous node had vanished; a fresh node was chosen and incremented.
    Restarted { stale: NodeId, to: NodeId },
    /// No node passes the filters.
    NoEligibleNode,
    /// The current node has no eligible outgoing relationship.
    DeadEnd(NodeId),
    /// The chosen node vanished before it could be incremented.
    Vanished(NodeId),
}

impl StepEvent {
    /// The state the tick produced, if any.
    pub fn state(&self) -> Option<WalkState> {
        match *self {
            StepEvent::Started(n)
            | StepEvent::Advanced { to: n, .. }
            | StepEvent::Restarted { to: n, .. } => Some(WalkState::new(n)),
            StepEvent::NoEligibleNode | StepEvent::DeadEnd(_) | StepEvent::Vanished(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkStats {
    pub ticks: u64,
    pub starts: u64,
    pub advances: u64,
    pub restarts: u64,
    pub dead_ends: u64,
    pub idle: u64,
    /// Ranks added by this engine.
    pub increments: u64,
}

impl WalkStats {
    fn record(&mut self, event: &StepEvent) {
        self.ticks += 1;
        match event {
            StepEvent::Started(_) => self.starts += 1,
            StepEvent::Advanced { .. } => {
                self.advances += 1;
                self.increments += 1;
            }
            StepEvent::Restarted { .. } => {
                self.restarts += 1;
                self.increments += 1;
            }
            StepEvent::DeadEnd(_) => self.dead_ends += 1,
            StepEvent::NoEligibleNode | StepEvent::Vanished(_) => self.idle += 1,
        }
    }

    pub fn merge(&mut self, other: &WalkStats) {
        self.ticks += other.ticks;
        self.starts += other.starts;
        self.advances += other.advances;
        self.restarts += other.restarts;
        self.dead_ends += other.dead_ends;
        self.idle += other.idle;
        self.increments += other.increments;
    }
}

/// A single walker: selectors, RNG, and bookkeeping.
///
/// The engine holds no walk position; the caller passes the previous
/// [`WalkState`] in and stores the returned one.
#[derive(Debug)]
pub struct WalkEngine<NS = RandomNodeSelector, RS = RandomRelationshipSelector> {
    node_selector: NS,
    relationship_selector: RS,
    rng: ChaCha8Rng,
    top: TopRankedNodes,
    stats: WalkStats,
}

impl WalkEngine {
    /// Uniform selectors that include everything.
    pub fn new(config: NodeRankConfig) -> Result<Self> {
        Self::with_filters(config, Arc::new(IncludeAll), Arc::new(IncludeAll))
    }

    /// Uniform selectors restricted by the given filters.
    ///
    /// The node filter applies both to start nodes and to the far end of every
    /// relationship the walk might follow.
    pub fn with_filters(
        config: NodeRankConfig,
        node_filter: Arc<dyn NodeFilter>,
        relationship_filter: Arc<dyn RelationshipFilter>,
    ) -> Result<Self> {
        Self::with_selectors(
            config,
            RandomNodeSelector::new(node_filter.clone()),
            RandomRelationshipSelector::new(relationship_filter, node_filter),
        )
    }
}

impl<NS, RS> WalkEngine<NS, RS>
where
    NS: NodeSelector,
    RS: RelationshipSelector,
{
    pub fn with_selectors(
        config: NodeRankConfig,
        node_selector: NS,
        relationship_selector: RS,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            node_selector,
            relationship_selector,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            top: TopRankedNodes::new(config.max_top_rank_nodes),
            stats: WalkStats::default(),
        })
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn top_ranked(&self) -> &TopRankedNodes {
        &self.top
    }

    pub fn top_ranked_mut(&mut self) -> &mut TopRankedNodes {
        &mut self.top
    }

    /// Choose a start node. Never increments a rank.
    pub fn initialize<G: GraphStore + ?Sized>(&mut self, graph: &G) -> Result<Option<WalkState>> {
        let event = self.start(graph)?;
        self.stats.record(&event);
        Ok(event.state())
    }

    /// Advance the walk by one step.
    ///
    /// With `previous == None` this is the same as [`WalkEngine::initialize`].
    pub fn step<G: GraphStore + ?Sized>(
        &mut self,
        previous: Option<WalkState>,
        graph: &G,
    ) -> Result<Option<WalkState>> {
        Ok(self.step_event(previous, graph)?.state())
    }

    /// Like [`WalkEngine::step`], but reports what happened.
    pub fn step_event<G: GraphStore + ?Sized>(
        &mut self,
        previous: Option<WalkState>,
        graph: &G,
    ) -> Result<StepEvent> {
        let event = match previous {
            None => {
                debug!("no previous walk state, starting from a random node");
                self.start(graph)?
            }
            Some(state) => self.resume(state, graph)?,
        };
        self.stats.record(&event);
        Ok(event)
    }

    pub fn shutdown(&mut self) {
        debug!(stats = ?self.stats, "node rank walker shut down");
    }

    fn start<G: GraphStore + ?Sized>(&mut self, graph: &G) -> Result<StepEvent> {
        match self.node_selector.select_node(graph, &mut self.rng)? {
            Some(node) => {
                info!(node = node.id, "starting node rank walk from random start node");
                Ok(StepEvent::Started(node.id))
            }
            None => {
                warn!("no start node found; no nodes match the configured filters");
                Ok(StepEvent::NoEligibleNode)
            }
        }
    }

    fn resume<G: GraphStore + ?Sized>(&mut self, state: WalkState, graph: &G) -> Result<StepEvent> {
        let current = match state.resolve(graph) {
            Ok(node) => node,
            Err(Error::NodeNotFound(stale)) => {
                warn!(
                    node = stale,
                    "last visited node no longer exists; restarting from a random node"
                );
                return self.restart(stale, graph);
            }
            Err(e) => return Err(e),
        };
        self.advance(current, graph)
    }

    fn restart<G: GraphStore + ?Sized>(&mut self, stale: NodeId, graph: &G) -> Result<StepEvent> {
        let Some(next) = self.node_selector.select_node(graph, &mut self.rng)? else {
            warn!("no node to restart from; no nodes match the configured filters");
            return Ok(StepEvent::NoEligibleNode);
        };
        Ok(match self.visit(next.id, graph)? {
            true => StepEvent::Restarted { stale, to: next.id },
            false => StepEvent::Vanished(next.id),
        })
    }

    fn advance<G: GraphStore + ?Sized>(&mut self, current: Node, graph: &G) -> Result<StepEvent> {
        let selected = match self
            .relationship_selector
            .select_relationship(graph, &current, &mut self.rng)
        {
            // Deleted between resolve and enumeration.
            Err(Error::NodeNotFound(id)) if id == current.id => {
                warn!(node = id, "current node vanished mid-step; restarting from a random node");
                return self.restart(id, graph);
            }
            other => other?,
        };
        let Some(rel) = selected else {
            warn!(node = current.id, "no relationship to follow; walk ends here");
            return Ok(StepEvent::DeadEnd(current.id));
        };
        let next = rel.other_node(current.id);
        debug!(
            from = current.id,
            to = next,
            relationship = rel.id,
            kind = %rel.kind,
            "following relationship"
        );
        Ok(match self.visit(next, graph)? {
            true => StepEvent::Advanced { from: current.id, to: next },
            false => StepEvent::Vanished(next),
        })
    }

    /// Increment `node`'s rank. `false` if it vanished after being selected.
    fn visit<G: GraphStore + ?Sized>(&mut self, node: NodeId, graph: &G) -> Result<bool> {
        match graph.increment_rank(node) {
            Ok(rank) => {
                self.top.offer(node, rank);
                Ok(true)
            }
            Err(Error::NodeNotFound(_)) => {
                warn!(node, "selected node vanished before its rank could be updated");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl<G, NS, RS> TickModule<G> for WalkEngine<NS, RS>
where
    G: GraphStore + ?Sized,
    NS: NodeSelector,
    RS: RelationshipSelector,
{
    type State = WalkState;

    fn initialize(&mut self, graph: &G) -> Result<Option<WalkState>> {
        WalkEngine::initialize(self, graph)
    }

    fn step(&mut self, previous: Option<WalkState>, graph: &G) -> Result<Option<WalkState>> {
        WalkEngine::step(self, previous, graph)
    }

    fn shutdown(&mut self) {
        WalkEngine::shutdown(self)
    }
}
