//! The synchronous step engine.
//!
//! [`step`] advances the whole population by exactly one discrete tick.
//! Every transition decision for a tick is made against the state the
//! population held when the tick began: states are captured up front, all
//! proposals are drawn against that capture, and the winning transitions
//! are applied simultaneously afterwards, so updates within a tick can
//! never influence each other.

use crate::compartment::Compartment;
use crate::model::{CompartmentalModel, Trigger};
use crate::population::{NodeId, Population};
use log::trace;
use rand::Rng;

/// Advances `population` by one tick under `model`.
///
/// Deterministic given a fixed `rng`: nodes are evaluated in id order,
/// rules in model order, and contact draws in neighbor order, stopping at
/// the first success. A node makes at most one transition per tick. The
/// step counter belongs to the caller (see [`crate::snapshot::Snapshot`]).
pub fn step<R: Rng + ?Sized>(
    population: &mut Population,
    model: &CompartmentalModel,
    rng: &mut R,
) {
    let before: Vec<Compartment> = population.nodes().map(|(_, node)| node.state).collect();

    let mut proposals: Vec<Option<Compartment>> = Vec::with_capacity(before.len());
    for index in 0..before.len() {
        proposals.push(propose_transition(
            population,
            &before,
            model,
            NodeId(index),
            rng,
        ));
    }

    let mut transitions = 0usize;
    for (index, proposal) in proposals.into_iter().enumerate() {
        let id = NodeId(index);
        match proposal {
            Some(state) => {
                population.set_state(id, state);
                transitions += 1;
            }
            None => population.node_mut(id).ticks_in_state += 1,
        }
    }
    trace!("applied {transitions} transitions across {} nodes", before.len());
}

/// Decides the node's transition for this tick, if any: contact rules
/// first, then spontaneous rules, first success wins.
fn propose_transition<R: Rng + ?Sized>(
    population: &Population,
    before: &[Compartment],
    model: &CompartmentalModel,
    id: NodeId,
    rng: &mut R,
) -> Option<Compartment> {
    let state = before[id.0];
    let node = population.node(id);

    for rule in model.contact_rules() {
        if rule.source != state {
            continue;
        }
        let probability = node.infect_probability.unwrap_or(rule.probability);
        for &neighbor in population.neighbors(id) {
            let neighbor_state = before[neighbor.0];
            // Quarantined and dead neighbors never transmit.
            if neighbor_state != rule.via || !neighbor_state.is_contact_source() {
                continue;
            }
            if rng.random_bool(probability) {
                return Some(rule.target);
            }
        }
    }

    for rule in model.spontaneous_rules() {
        if rule.source != state {
            continue;
        }
        let fires = match rule.trigger {
            Trigger::Probability(p) => rng.random_bool(p),
            // Residence includes the tick being applied, so a node that
            // entered the compartment `d` ticks ago leaves on this one.
            Trigger::AfterTicks(d) => node.ticks_in_state + 1 >= d,
        };
        if fires {
            return Some(rule.target);
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::step;
    use crate::compartment::Compartment;
    use crate::model::ModelParameters;
    use crate::population::{NodeId, Population};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ring(node_count: usize) -> Population {
        let edges: Vec<(usize, usize)> = (0..node_count)
            .map(|a| (a, (a + 1) % node_count))
            .collect();
        Population::from_edges(node_count, &edges).unwrap()
    }

    #[test]
    fn sir_ring_spreads_to_both_neighbors_in_one_tick() {
        let mut population = ring(10);
        population.set_state(NodeId(0), Compartment::Infected);
        let model = ModelParameters::Sir {
            p_infect: 1.0,
            p_recover: 0.0,
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        step(&mut population, &model, &mut rng);

        for (id, node) in population.nodes() {
            let expected = match id.0 {
                0 | 1 | 9 => Compartment::Infected,
                _ => Compartment::Susceptible,
            };
            assert_eq!(node.state, expected, "node {}", id.0);
        }
    }

    #[test]
    fn states_stay_within_the_declared_compartments() {
        let variants = [
            ModelParameters::Sir {
                p_infect: 0.8,
                p_recover: 0.3,
            },
            ModelParameters::Sis {
                p_infect: 0.8,
                p_recover: 0.3,
            },
            ModelParameters::Sird {
                p_infect: 0.8,
                p_recover: 0.3,
                p_death: 0.2,
            },
            ModelParameters::SirsDuration {
                p_infect: 0.8,
                p_recover: 0.3,
                recovery_duration: 2,
            },
            ModelParameters::SirsProbability {
                p_infect: 0.8,
                p_recover: 0.3,
                p_susceptible: 0.4,
            },
            ModelParameters::Seir {
                p_infect: 0.8,
                p_exposed_to_infectious: 0.5,
                p_recover: 0.3,
            },
            ModelParameters::SeirsImmunityPeriod {
                p_infect: 0.8,
                p_exposed_to_infectious: 0.5,
                p_recover: 0.3,
                immunity_period: 2,
            },
            ModelParameters::SeirsLossProbability {
                p_infect: 0.8,
                p_exposed_to_infectious: 0.5,
                p_recover: 0.3,
                p_susceptible: 0.4,
            },
        ];
        for (offset, parameters) in variants.into_iter().enumerate() {
            let model = parameters.build().unwrap();
            let mut population = ring(20);
            let mut rng = StdRng::seed_from_u64(100 + offset as u64);
            population.seed(0.2, &model, &mut rng);
            for _ in 0..10 {
                step(&mut population, &model, &mut rng);
                for (_, node) in population.nodes() {
                    assert!(model.declares(node.state), "{:?}", node.state);
                }
            }
            assert_eq!(population.node_count(), 20);
        }
    }

    #[test]
    fn identical_seeds_produce_identical_runs() {
        let model = ModelParameters::Seir {
            p_infect: 0.4,
            p_exposed_to_infectious: 0.3,
            p_recover: 0.2,
        }
        .build()
        .unwrap();

        let mut first = ring(30);
        let mut second = first.clone();
        let mut rng_first = StdRng::seed_from_u64(7);
        let mut rng_second = StdRng::seed_from_u64(7);
        first.seed(0.1, &model, &mut rng_first);
        second.seed(0.1, &model, &mut rng_second);

        for _ in 0..20 {
            step(&mut first, &model, &mut rng_first);
            step(&mut second, &model, &mut rng_second);
        }
        assert_eq!(first, second);
    }

    #[test]
    fn sird_resolves_competing_exits_to_a_single_transition() {
        let model = ModelParameters::Sird {
            p_infect: 0.0,
            p_recover: 0.5,
            p_death: 0.5,
        }
        .build()
        .unwrap();
        for seed in 0..50 {
            let mut population = Population::from_edges(1, &[]).unwrap();
            population.set_state(NodeId(0), Compartment::Infected);
            let mut rng = StdRng::seed_from_u64(seed);
            step(&mut population, &model, &mut rng);
            let state = population.node(NodeId(0)).state;
            assert!(
                matches!(
                    state,
                    Compartment::Infected | Compartment::Recovered | Compartment::Dead
                ),
                "{state:?}"
            );
        }
    }

    #[test]
    fn sird_recovery_wins_when_both_exits_are_certain() {
        let model = ModelParameters::Sird {
            p_infect: 0.0,
            p_recover: 1.0,
            p_death: 1.0,
        }
        .build()
        .unwrap();
        let mut population = Population::from_edges(1, &[]).unwrap();
        population.set_state(NodeId(0), Compartment::Infected);
        let mut rng = StdRng::seed_from_u64(42);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Recovered);
    }

    #[test]
    fn quarantined_neighbor_does_not_transmit() {
        let mut population = Population::from_edges(2, &[(0, 1)]).unwrap();
        population.set_state(NodeId(1), Compartment::Quarantined);
        let model = ModelParameters::Sir {
            p_infect: 1.0,
            p_recover: 0.0,
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Susceptible);
    }

    #[test]
    fn seir_contact_exposes_instead_of_infecting() {
        let mut population = Population::from_edges(2, &[(0, 1)]).unwrap();
        population.set_state(NodeId(1), Compartment::Infected);
        let model = ModelParameters::Seir {
            p_infect: 1.0,
            p_exposed_to_infectious: 0.0,
            p_recover: 0.0,
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Exposed);
    }

    #[test]
    fn duration_rule_fires_exactly_when_residence_is_reached() {
        let model = ModelParameters::SirsDuration {
            p_infect: 0.0,
            p_recover: 0.0,
            recovery_duration: 3,
        }
        .build()
        .unwrap();
        let mut population = Population::from_edges(1, &[]).unwrap();
        population.set_state(NodeId(0), Compartment::Recovered);
        let mut rng = StdRng::seed_from_u64(42);

        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Recovered);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Recovered);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Susceptible);
    }

    #[test]
    fn per_node_infect_probability_overrides_the_rule() {
        let model = ModelParameters::Sir {
            p_infect: 1.0,
            p_recover: 0.0,
        }
        .build()
        .unwrap();
        let mut population = Population::from_edges(2, &[(0, 1)]).unwrap();
        population.set_state(NodeId(1), Compartment::Infected);
        population.node_mut(NodeId(0)).infect_probability = Some(0.0);
        let mut rng = StdRng::seed_from_u64(42);
        step(&mut population, &model, &mut rng);
        assert_eq!(population.node(NodeId(0)).state, Compartment::Susceptible);
    }
}
