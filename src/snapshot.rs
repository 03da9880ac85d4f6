//! Serializable simulation snapshots.
//!
//! A snapshot is the externally persisted form of a population: the full
//! topology, every node attribute, and the driver's step counter. It is
//! the unit exchanged with the driving loop — export, hand to storage or
//! a renderer, import, and keep stepping. A snapshot plus a model and a
//! random source fully determines the next tick; no simulation state
//! lives anywhere else.

use crate::error::EpinetError;
use crate::population::{Node, Population};
use serde::{Deserialize, Serialize};

/// The complete, serializable state of a simulation at one tick.
///
/// Node order is preserved and each undirected edge appears once with its
/// endpoints in ascending order, so capture followed by restore
/// reproduces an identical population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks applied so far; owned by the driving loop, not the engine.
    pub step: u64,
    nodes: Vec<Node>,
    edges: Vec<(usize, usize)>,
}

impl Snapshot {
    /// Captures the population together with the caller's step counter.
    #[must_use]
    pub fn capture(population: &Population, step: u64) -> Snapshot {
        let nodes = population.nodes().map(|(_, node)| node.clone()).collect();
        let mut edges = Vec::with_capacity(population.edge_count());
        for (id, _) in population.nodes() {
            for &neighbor in population.neighbors(id) {
                if id.0 < neighbor.0 {
                    edges.push((id.0, neighbor.0));
                }
            }
        }
        Snapshot { step, nodes, edges }
    }

    /// Rebuilds a live population equivalent to the captured one.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology is malformed (the same checks as
    /// [`Population::from_edges`]).
    pub fn restore(&self) -> Result<Population, EpinetError> {
        Population::from_parts(self.nodes.clone(), &self.edges)
    }

    /// Serializes the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, EpinetError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid snapshot document.
    pub fn from_json(json: &str) -> Result<Snapshot, EpinetError> {
        Ok(serde_json::from_str(json)?)
    }
}
