//! Module implementing synapses and the point-to-point connections they produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CircuitError;

/// The effect of a connection on its target.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Depolarizing input, pushes the target towards firing.
    Excitatory,
    /// Hyperpolarizing input, holds the target back.
    Inhibitory,
}

impl Polarity {
    /// Returns the opposite polarity.
    pub fn inverse(&self) -> Polarity {
        match self {
            Polarity::Excitatory => Polarity::Inhibitory,
            Polarity::Inhibitory => Polarity::Excitatory,
        }
    }

    /// Returns the signed multiplier applied to the synaptic weight.
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Excitatory => 1.0,
            Polarity::Inhibitory => -1.0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Polarity::Excitatory => write!(f, "excitatory"),
            Polarity::Inhibitory => write!(f, "inhibitory"),
        }
    }
}

impl FromStr for Polarity {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excitatory" => Ok(Polarity::Excitatory),
            "inhibitory" => Ok(Polarity::Inhibitory),
            other => Err(CircuitError::Configuration(format!(
                "receptor type {:?} is not supported",
                other
            ))),
        }
    }
}

/// A static synapse, i.e., the weight and delay shared by the connections of a projection.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct Synapse {
    /// Synapse weight (magnitude, the sign is carried by the polarity)
    weight: f64,
    /// Synapse delay (must be non-negative)
    delay: f64,
}

impl Synapse {
    /// Create a new synapse with the specified parameters.
    /// Returns an error if the delay is negative or if any parameter is not finite.
    pub fn build(weight: f64, delay: f64) -> Result<Self, CircuitError> {
        if !weight.is_finite() || !delay.is_finite() {
            return Err(CircuitError::InvalidParameter(
                "Synapse weight and delay must be finite".to_string(),
            ));
        }
        if delay < 0.0 {
            return Err(CircuitError::InvalidParameter(
                "Synapse delay must be non-negative".to_string(),
            ));
        }
        Ok(Synapse { weight, delay })
    }

    /// Returns the weight of the synapse.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the delay of the synapse.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Returns a copy of the synapse whose delay is lengthened by `extra`.
    pub fn delayed(&self, extra: f64) -> Result<Self, CircuitError> {
        Synapse::build(self.weight, self.delay + extra)
    }
}

/// Represents a point-to-point connection between two neurons of an engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Connection {
    /// ID of the sending neuron
    source_id: usize,
    /// ID of the receiving neuron
    target_id: usize,
    /// Weight of the connection
    weight: f64,
    /// Delay of the connection
    delay: f64,
    /// Polarity of the connection
    polarity: Polarity,
}

impl Connection {
    /// Create a new connection carrying the given synapse.
    pub fn new(source_id: usize, target_id: usize, synapse: &Synapse, polarity: Polarity) -> Self {
        Connection {
            source_id,
            target_id,
            weight: synapse.weight(),
            delay: synapse.delay(),
            polarity,
        }
    }

    /// Get the id of the sending neuron.
    pub fn source_id(&self) -> usize {
        self.source_id
    }

    /// Get the id of the receiving neuron.
    pub fn target_id(&self) -> usize {
        self.target_id
    }

    /// Get the weight of the connection.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Get the delay of the connection.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Get the polarity of the connection.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Get the signed weight, negative for inhibitory connections.
    pub fn signed_weight(&self) -> f64 {
        self.polarity.sign() * self.weight
    }
}
