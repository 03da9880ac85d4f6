//! A discrete-time engine for simulating epidemic spread on contact networks
//!
//! Epinet models a population as an undirected contact graph in which every
//! node carries an epidemiological state. Disease dynamics are described
//! declaratively: a [`CompartmentalModel`] is an ordered set of compartments
//! plus the probabilistic transition rules connecting them, and one generic
//! step function ([`engine::step`]) interprets any such rule set, advancing
//! the whole population by a single discrete tick.
//!
//! A simulation usually consists of:
//! * A contact graph supplied by the caller and wrapped in a
//!   [`Population`] via [`Population::from_edges`].
//! * A model built from one of the [`ModelParameters`] variants (SIR,
//!   SIS, SIRD, and the SIRS, SEIR and SEIRS flavors).
//! * A driving loop that calls [`engine::step`] once per tick, applying
//!   [`interventions`] (quarantine, edge removal, vaccination) in between.
//! * A [`Snapshot`] exchanged with the driver for persistence and
//!   rendering; per-tick prevalence can be recorded with
//!   [`report::ReportWriter`].
//!
//! All randomness is injected: every stochastic entry point takes an
//! `&mut impl Rng`, and [`random::stream_rng`] derives reproducible named
//! streams from a single experiment seed.

pub mod compartment;
pub mod engine;
pub mod error;
pub mod interventions;
pub mod model;
pub mod population;
pub mod random;
pub mod report;
pub mod snapshot;

pub use compartment::Compartment;
pub use error::EpinetError;
pub use model::{CompartmentalModel, ModelParameters};
pub use population::{Node, NodeId, Population};
pub use snapshot::Snapshot;

// Consumers should draw from the same `rand` this crate draws from.
pub use rand;
