//! Host-side driver for a single walk.

use crate::engine::{StepEvent, WalkEngine};
use crate::graph::GraphStore;
use crate::select::{
    NodeSelector, RandomNodeSelector, RandomRelationshipSelector, RelationshipSelector,
};
use crate::state::WalkState;
use crate::Result;

/// Holds a walk's position between ticks.
///
/// Whatever a tick returns is stored as-is: after a dead end or an idle tick the
/// state is `None`, so the next tick picks a fresh start node.
#[derive(Debug)]
pub struct Walker<NS = RandomNodeSelector, RS = RandomRelationshipSelector> {
    engine: WalkEngine<NS, RS>,
    state: Option<WalkState>,
}

impl<NS, RS> Walker<NS, RS>
where
    NS: NodeSelector,
    RS: RelationshipSelector,
{
    pub fn new(engine: WalkEngine<NS, RS>) -> Self {
        Self { engine, state: None }
    }

    /// Resume from a previously persisted state.
    pub fn resume(engine: WalkEngine<NS, RS>, state: Option<WalkState>) -> Self {
        Self { engine, state }
    }

    pub fn state(&self) -> Option<WalkState> {
        self.state
    }

    pub fn engine(&self) -> &WalkEngine<NS, RS> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut WalkEngine<NS, RS> {
        &mut self.engine
    }

    pub fn tick<G: GraphStore + ?Sized>(&mut self, graph: &G) -> Result<StepEvent> {
        let event = self.engine.step_event(self.state, graph)?;
        self.state = event.state();
        Ok(event)
    }

    /// Run `ticks` ticks, stopping early only on a store failure.
    pub fn run<G: GraphStore + ?Sized>(&mut self, graph: &G, ticks: usize) -> Result<()> {
        for _ in 0..ticks {
            self.tick(graph)?;
        }
        Ok(())
    }

    pub fn into_engine(mut self) -> WalkEngine<NS, RS> {
        self.engine.shutdown();
        self.engine
    }
}
