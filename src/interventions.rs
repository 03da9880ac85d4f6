//! Population-level interventions.
//!
//! Each operator takes the live population and a count, mutates it in
//! place, and returns the ids it touched. Selection is uniform without
//! replacement and fresh on every call; a request larger than the
//! eligible set saturates rather than erring.

use crate::compartment::Compartment;
use crate::error::EpinetError;
use crate::population::{NodeId, Population};
use crate::random::{sample_indices, sample_nodes};
use log::debug;
use rand::Rng;

/// Overwrites the state of `min(count, |V|)` randomly chosen nodes with
/// `Quarantined`.
///
/// The prior compartment is discarded, so quarantine cannot later be
/// lifted back to it. Quarantined nodes stop transmitting but receive no
/// protection from the engine itself; they stay frozen only because no
/// model declares a rule out of `Quarantined`.
pub fn quarantine<R: Rng + ?Sized>(
    population: &mut Population,
    count: usize,
    rng: &mut R,
) -> Vec<NodeId> {
    let selected = sample_nodes(rng, population.node_count(), count);
    for &id in &selected {
        population.set_state(id, Compartment::Quarantined);
    }
    debug!("quarantined {} nodes ({count} requested)", selected.len());
    selected
}

/// Removes every edge incident to each of `min(count, |V|)` randomly
/// chosen nodes, fully isolating them.
pub fn disconnect<R: Rng + ?Sized>(
    population: &mut Population,
    count: usize,
    rng: &mut R,
) -> Vec<NodeId> {
    let selected = sample_nodes(rng, population.node_count(), count);
    let mut removed = 0;
    for &id in &selected {
        removed += population.remove_incident_edges(id);
    }
    debug!(
        "disconnected {} nodes, removing {removed} edges",
        selected.len()
    );
    selected
}

/// Vaccinates `min(count, eligible)` nodes drawn from those currently
/// susceptible or infected and not yet vaccinated.
///
/// Each selected node is forced susceptible (vaccinating an infected node
/// cures it), has its per-node infect probability replaced with
/// `p_vaccinate`, and is permanently marked vaccinated. Zero eligible
/// nodes is a no-op.
///
/// # Errors
///
/// Returns an error if `p_vaccinate` lies outside [0, 1]; the engine
/// draws against the stored value on later ticks and never re-validates.
pub fn vaccinate<R: Rng + ?Sized>(
    population: &mut Population,
    count: usize,
    p_vaccinate: f64,
    rng: &mut R,
) -> Result<Vec<NodeId>, EpinetError> {
    if !(0.0..=1.0).contains(&p_vaccinate) {
        return Err(EpinetError::EpinetError(format!(
            "vaccination probability must lie in [0, 1], got {p_vaccinate}"
        )));
    }

    let eligible: Vec<NodeId> = population
        .nodes()
        .filter(|(_, node)| {
            !node.vaccinated
                && matches!(
                    node.state,
                    Compartment::Susceptible | Compartment::Infected
                )
        })
        .map(|(id, _)| id)
        .collect();

    let selected: Vec<NodeId> = sample_indices(rng, eligible.len(), count)
        .into_iter()
        .map(|index| eligible[index])
        .collect();
    for &id in &selected {
        population.set_state(id, Compartment::Susceptible);
        let node = population.node_mut(id);
        node.infect_probability = Some(p_vaccinate);
        node.vaccinated = true;
    }
    debug!("vaccinated {} nodes ({count} requested)", selected.len());
    Ok(selected)
}
