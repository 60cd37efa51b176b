//! Named read-only queries over a built [`Graph`], composed from the walk
//! engine. Every query tolerates "not found" at each step and degrades to an
//! empty or partial answer.

pub mod application;
pub mod component;
pub mod queries;
pub mod resources;

use crate::dump::LaneState;
use crate::graph::Graph;

pub use application::{AccessAction, ApplicationTriggers, TriggerAction};
pub use component::ComponentCalledBy;

/// A snapshot together with the graph built from it.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    pub state: &'a LaneState,
    pub graph: &'a Graph,
}

impl<'a> Analyzer<'a> {
    pub fn new(state: &'a LaneState, graph: &'a Graph) -> Self {
        Self { state, graph }
    }
}
