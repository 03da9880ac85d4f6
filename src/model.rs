//! Declarative compartmental models.
//!
//! A model is an ordered set of compartments plus the transition rules
//! connecting them. All eight disease variants (SIR, SIS, SIRD, two SIRS
//! flavors, SEIR, two SEIRS flavors) are expressed through the same two
//! rule shapes, which lets [`crate::engine::step`] be one generic
//! interpreter instead of a bespoke step function per variant.
//!
//! Rule order is part of a model's contract. The engine evaluates contact
//! rules first and spontaneous rules second, each in declaration order,
//! and the first rule whose draw succeeds claims the node's single
//! transition for the tick. SIRD relies on this to resolve the competing
//! exits from the infected compartment.

use crate::compartment::Compartment;
use crate::error::EpinetError;

/// A transition triggered by adjacency to a neighbor in the `via`
/// compartment.
///
/// The engine performs one independent Bernoulli draw per qualifying
/// neighbor-edge, in neighbor order, stopping at the first success; a
/// node with `k` qualifying neighbors escapes with probability
/// `(1 - p)^k`. A node-level `infect_probability` override replaces
/// `probability` for that node's draws.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactRule {
    pub source: Compartment,
    pub target: Compartment,
    pub via: Compartment,
    pub probability: f64,
}

/// What causes a spontaneous rule to fire.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Trigger {
    /// One Bernoulli draw per tick spent in the source compartment.
    Probability(f64),
    /// Fires deterministically once the node's residence in the source
    /// compartment reaches this many ticks.
    AfterTicks(u32),
}

/// A transition that does not depend on neighbors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpontaneousRule {
    pub source: Compartment,
    pub target: Compartment,
    pub trigger: Trigger,
}

/// An immutable rule set interpreted by the step engine.
#[derive(Clone, Debug, PartialEq)]
pub struct CompartmentalModel {
    compartments: Vec<Compartment>,
    contact_rules: Vec<ContactRule>,
    spontaneous_rules: Vec<SpontaneousRule>,
}

impl CompartmentalModel {
    /// Starts an empty model over the given compartments. Rules added to
    /// the builder must stay within this set; [`ModelBuilder::build`]
    /// enforces it.
    #[must_use]
    pub fn builder(compartments: &[Compartment]) -> ModelBuilder {
        ModelBuilder {
            model: CompartmentalModel {
                compartments: compartments.to_vec(),
                contact_rules: Vec::new(),
                spontaneous_rules: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    #[must_use]
    pub fn contact_rules(&self) -> &[ContactRule] {
        &self.contact_rules
    }

    #[must_use]
    pub fn spontaneous_rules(&self) -> &[SpontaneousRule] {
        &self.spontaneous_rules
    }

    /// Whether the model declares the compartment.
    #[must_use]
    pub fn declares(&self, compartment: Compartment) -> bool {
        self.compartments.contains(&compartment)
    }

    /// The compartment assigned to initially seeded nodes: exposed when
    /// the model has an exposed compartment, infected otherwise.
    #[must_use]
    pub fn seed_compartment(&self) -> Compartment {
        if self.declares(Compartment::Exposed) {
            Compartment::Exposed
        } else {
            Compartment::Infected
        }
    }
}

/// Assembles a [`CompartmentalModel`], validating it on `build`.
pub struct ModelBuilder {
    model: CompartmentalModel,
}

impl ModelBuilder {
    #[must_use]
    pub fn contact(
        mut self,
        source: Compartment,
        target: Compartment,
        via: Compartment,
        probability: f64,
    ) -> Self {
        self.model.contact_rules.push(ContactRule {
            source,
            target,
            via,
            probability,
        });
        self
    }

    #[must_use]
    pub fn spontaneous(
        mut self,
        source: Compartment,
        target: Compartment,
        trigger: Trigger,
    ) -> Self {
        self.model.spontaneous_rules.push(SpontaneousRule {
            source,
            target,
            trigger,
        });
        self
    }

    /// Finishes the model.
    ///
    /// # Errors
    ///
    /// Returns an error if any probability lies outside [0, 1], any
    /// duration is zero, or any rule references a compartment the model
    /// does not declare. Stepping assumes built models are valid and
    /// never re-checks.
    pub fn build(self) -> Result<CompartmentalModel, EpinetError> {
        for rule in &self.model.contact_rules {
            check_probability(rule.probability)?;
            self.check_declared(&[rule.source, rule.target, rule.via])?;
        }
        for rule in &self.model.spontaneous_rules {
            match rule.trigger {
                Trigger::Probability(p) => check_probability(p)?,
                Trigger::AfterTicks(0) => {
                    return Err(EpinetError::EpinetError(String::from(
                        "duration must be at least one tick",
                    )));
                }
                Trigger::AfterTicks(_) => {}
            }
            self.check_declared(&[rule.source, rule.target])?;
        }
        Ok(self.model)
    }

    fn check_declared(&self, compartments: &[Compartment]) -> Result<(), EpinetError> {
        for &compartment in compartments {
            if !self.model.declares(compartment) {
                return Err(EpinetError::EpinetError(format!(
                    "rule references undeclared compartment {compartment}"
                )));
            }
        }
        Ok(())
    }
}

fn check_probability(probability: f64) -> Result<(), EpinetError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(EpinetError::EpinetError(format!(
            "probability must lie in [0, 1], got {probability}"
        )));
    }
    Ok(())
}

/// Disease parameters for the eight supported model variants.
///
/// A closed, typed set: each variant carries exactly the parameters its
/// rule set needs, and [`ModelParameters::build`] resolves the variant
/// once at construction instead of re-branching on a name every tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ModelParameters {
    /// S→I by contact with I; I→R spontaneously.
    Sir { p_infect: f64, p_recover: f64 },
    /// S→I by contact with I; I→S spontaneously.
    Sis { p_infect: f64, p_recover: f64 },
    /// As SIR, plus a competing I→D exit. Recovery is evaluated before
    /// death.
    Sird {
        p_infect: f64,
        p_recover: f64,
        p_death: f64,
    },
    /// As SIR, plus R→S once a node has been recovered for
    /// `recovery_duration` ticks.
    SirsDuration {
        p_infect: f64,
        p_recover: f64,
        recovery_duration: u32,
    },
    /// As SIR, plus R→S with a fixed per-tick probability.
    SirsProbability {
        p_infect: f64,
        p_recover: f64,
        p_susceptible: f64,
    },
    /// S→E by contact with I; E→I and I→R spontaneously.
    Seir {
        p_infect: f64,
        p_exposed_to_infectious: f64,
        p_recover: f64,
    },
    /// As SEIR, plus R→S once immunity has lasted `immunity_period`
    /// ticks.
    SeirsImmunityPeriod {
        p_infect: f64,
        p_exposed_to_infectious: f64,
        p_recover: f64,
        immunity_period: u32,
    },
    /// As SEIR, plus R→S with a fixed per-tick probability.
    SeirsLossProbability {
        p_infect: f64,
        p_exposed_to_infectious: f64,
        p_recover: f64,
        p_susceptible: f64,
    },
}

impl ModelParameters {
    /// Builds the immutable rule set for this variant.
    ///
    /// # Errors
    ///
    /// Returns an error when a probability lies outside [0, 1] or a
    /// duration is zero.
    pub fn build(self) -> Result<CompartmentalModel, EpinetError> {
        use Compartment::{Dead, Exposed, Infected, Recovered, Susceptible};

        match self {
            ModelParameters::Sir { p_infect, p_recover } => {
                CompartmentalModel::builder(&[Susceptible, Infected, Recovered])
                    .contact(Susceptible, Infected, Infected, p_infect)
                    .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                    .build()
            }
            ModelParameters::Sis { p_infect, p_recover } => {
                CompartmentalModel::builder(&[Susceptible, Infected])
                    .contact(Susceptible, Infected, Infected, p_infect)
                    .spontaneous(Infected, Susceptible, Trigger::Probability(p_recover))
                    .build()
            }
            ModelParameters::Sird {
                p_infect,
                p_recover,
                p_death,
            } => CompartmentalModel::builder(&[Susceptible, Infected, Recovered, Dead])
                .contact(Susceptible, Infected, Infected, p_infect)
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .spontaneous(Infected, Dead, Trigger::Probability(p_death))
                .build(),
            ModelParameters::SirsDuration {
                p_infect,
                p_recover,
                recovery_duration,
            } => CompartmentalModel::builder(&[Susceptible, Infected, Recovered])
                .contact(Susceptible, Infected, Infected, p_infect)
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .spontaneous(Recovered, Susceptible, Trigger::AfterTicks(recovery_duration))
                .build(),
            ModelParameters::SirsProbability {
                p_infect,
                p_recover,
                p_susceptible,
            } => CompartmentalModel::builder(&[Susceptible, Infected, Recovered])
                .contact(Susceptible, Infected, Infected, p_infect)
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .spontaneous(Recovered, Susceptible, Trigger::Probability(p_susceptible))
                .build(),
            ModelParameters::Seir {
                p_infect,
                p_exposed_to_infectious,
                p_recover,
            } => CompartmentalModel::builder(&[Susceptible, Exposed, Infected, Recovered])
                .contact(Susceptible, Exposed, Infected, p_infect)
                .spontaneous(Exposed, Infected, Trigger::Probability(p_exposed_to_infectious))
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .build(),
            ModelParameters::SeirsImmunityPeriod {
                p_infect,
                p_exposed_to_infectious,
                p_recover,
                immunity_period,
            } => CompartmentalModel::builder(&[Susceptible, Exposed, Infected, Recovered])
                .contact(Susceptible, Exposed, Infected, p_infect)
                .spontaneous(Exposed, Infected, Trigger::Probability(p_exposed_to_infectious))
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .spontaneous(Recovered, Susceptible, Trigger::AfterTicks(immunity_period))
                .build(),
            ModelParameters::SeirsLossProbability {
                p_infect,
                p_exposed_to_infectious,
                p_recover,
                p_susceptible,
            } => CompartmentalModel::builder(&[Susceptible, Exposed, Infected, Recovered])
                .contact(Susceptible, Exposed, Infected, p_infect)
                .spontaneous(Exposed, Infected, Trigger::Probability(p_exposed_to_infectious))
                .spontaneous(Infected, Recovered, Trigger::Probability(p_recover))
                .spontaneous(Recovered, Susceptible, Trigger::Probability(p_susceptible))
                .build(),
        }
    }
}
