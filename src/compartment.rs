//! The closed set of epidemiological compartments.
//!
//! Every model declares which of these tags its nodes may occupy. The
//! serde representation uses short wire tags, so snapshot consumers (for
//! instance a renderer keying node colors) match on the serialized form
//! without knowing anything else about this crate.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A mutually exclusive epidemiological category a node can occupy.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compartment {
    #[serde(rename = "S")]
    Susceptible,
    #[serde(rename = "E")]
    Exposed,
    #[serde(rename = "I")]
    Infected,
    #[serde(rename = "R")]
    Recovered,
    #[serde(rename = "D")]
    Dead,
    #[serde(rename = "Quarantined")]
    Quarantined,
}

impl Compartment {
    /// Every compartment any model can declare, in tabulation order.
    pub const ALL: [Compartment; 6] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infected,
        Compartment::Recovered,
        Compartment::Dead,
        Compartment::Quarantined,
    ];

    /// The short tag used in serialized snapshots.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Exposed => "E",
            Compartment::Infected => "I",
            Compartment::Recovered => "R",
            Compartment::Dead => "D",
            Compartment::Quarantined => "Quarantined",
        }
    }

    /// Whether a node in this compartment can transmit along an edge.
    /// Quarantined and dead nodes never act as a contact source, even if
    /// a rule names them as its `via` compartment.
    #[must_use]
    pub fn is_contact_source(self) -> bool {
        !matches!(self, Compartment::Quarantined | Compartment::Dead)
    }
}

impl Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
