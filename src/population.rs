//! The population contact graph.
//!
//! An undirected graph over a fixed node set. Nodes are created once at
//! construction and never added or removed; edges may be removed by
//! interventions but never added. All epidemiological state lives in the
//! per-node attributes, so a population plus a step counter fully
//! determines the simulation (see [`crate::snapshot`]).

use crate::compartment::Compartment;
use crate::error::EpinetError;
use crate::model::CompartmentalModel;
use crate::random::sample_nodes;
use log::trace;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Identifies one member of the population.
#[derive(
    Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub usize);

/// Per-node epidemiological attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Current compartment; always one the active model declares.
    pub state: Compartment,
    /// Per-node override of the contact infection probability. `None`
    /// inherits the rule's probability. Set by vaccination.
    pub infect_probability: Option<f64>,
    /// Monotonic: set by vaccination, never reset.
    pub vaccinated: bool,
    /// Ticks spent in the current compartment; drives duration rules.
    pub ticks_in_state: u32,
}

impl Node {
    fn susceptible() -> Node {
        Node {
            state: Compartment::Susceptible,
            infect_probability: None,
            vaccinated: false,
            ticks_in_state: 0,
        }
    }
}

/// An undirected contact graph with per-node epidemiological state.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<NodeId>>,
}

impl Population {
    /// Builds a population of `node_count` fresh susceptible nodes from an
    /// externally supplied undirected edge list.
    ///
    /// # Errors
    ///
    /// Returns an error on self-loops, endpoints outside `0..node_count`,
    /// or duplicate edges.
    pub fn from_edges(
        node_count: usize,
        edges: &[(usize, usize)],
    ) -> Result<Population, EpinetError> {
        let mut adjacency = vec![Vec::new(); node_count];
        let mut seen = FxHashSet::default();
        for &(a, b) in edges {
            if a == b {
                return Err(EpinetError::EpinetError(format!(
                    "cannot make edge from node {a} to itself"
                )));
            }
            if a >= node_count || b >= node_count {
                return Err(EpinetError::EpinetError(format!(
                    "edge ({a}, {b}) endpoint out of range"
                )));
            }
            if !seen.insert((a.min(b), a.max(b))) {
                return Err(EpinetError::EpinetError(format!(
                    "edge ({a}, {b}) already exists"
                )));
            }
            adjacency[a].push(NodeId(b));
            adjacency[b].push(NodeId(a));
        }
        Ok(Population {
            nodes: vec![Node::susceptible(); node_count],
            adjacency,
        })
    }

    /// Rebuilds a population from captured snapshot parts.
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        edges: &[(usize, usize)],
    ) -> Result<Population, EpinetError> {
        let mut population = Population::from_edges(nodes.len(), edges)?;
        population.nodes = nodes;
        Ok(population)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges currently in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Iterates nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (NodeId(id), node))
    }

    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adjacency[id.0]
    }

    /// Puts the node in `state` and restarts its residence clock.
    pub fn set_state(&mut self, id: NodeId, state: Compartment) {
        let node = &mut self.nodes[id.0];
        node.state = state;
        node.ticks_in_state = 0;
    }

    /// Number of nodes currently in `compartment`.
    #[must_use]
    pub fn count_in(&self, compartment: Compartment) -> usize {
        self.nodes.iter().filter(|node| node.state == compartment).count()
    }

    /// Resets every node to a fresh susceptible: not vaccinated, inherited
    /// infect probability, zero residence. Topology is untouched.
    pub fn initialize(&mut self) {
        trace!("initializing population of {} nodes", self.nodes.len());
        for node in &mut self.nodes {
            *node = Node::susceptible();
        }
    }

    /// Puts `round(fraction × node_count)` distinct nodes, chosen
    /// uniformly at random, into the model's seed compartment. Zero
    /// selected nodes is a no-op; the request saturates at the population
    /// size. Returns the seeded ids.
    pub fn seed<R: Rng + ?Sized>(
        &mut self,
        fraction: f64,
        model: &CompartmentalModel,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let requested = (fraction * self.node_count() as f64).round() as usize;
        let seeded = sample_nodes(rng, self.node_count(), requested);
        let compartment = model.seed_compartment();
        for &id in &seeded {
            self.set_state(id, compartment);
        }
        trace!("seeded {} nodes as {compartment}", seeded.len());
        seeded
    }

    /// Removes the undirected edge between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), EpinetError> {
        if !remove_neighbor(&mut self.adjacency, a, b) {
            return Err(EpinetError::EpinetError(format!(
                "edge ({}, {}) does not exist",
                a.0, b.0
            )));
        }
        remove_neighbor(&mut self.adjacency, b, a);
        Ok(())
    }

    /// Removes every edge incident to `id`, fully isolating the node.
    /// Returns the number of edges removed.
    pub fn remove_incident_edges(&mut self, id: NodeId) -> usize {
        let neighbors = std::mem::take(&mut self.adjacency[id.0]);
        for &neighbor in &neighbors {
            self.adjacency[neighbor.0].retain(|&other| other != id);
        }
        neighbors.len()
    }
}

fn remove_neighbor(adjacency: &mut [Vec<NodeId>], from: NodeId, target: NodeId) -> bool {
    let list = &mut adjacency[from.0];
    match list.iter().position(|&neighbor| neighbor == target) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
