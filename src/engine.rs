//! The narrow set of capabilities the blocks need from a simulation engine.
//!
//! Blocks never run or record a simulation: they only allocate populations,
//! carve single-unit views out of them and register projections. Any engine
//! implementing [`Engine`] can host the circuits; [`crate::network::Network`]
//! is the in-memory reference implementation.

use serde::{Deserialize, Serialize};

use crate::config::NeuronParams;
use crate::connection::{Polarity, Synapse};
use crate::error::CircuitError;

/// A handle to a population (or a view of one) issued by an engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Population {
    id: usize,
    size: usize,
}

impl Population {
    /// Create a handle. Only engines should need this.
    pub fn new(id: usize, size: usize) -> Self {
        Population { id, size }
    }

    /// Returns the engine-wide ID of the population.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the number of units in the population.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// The model of the units of a population.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum NeuronModel {
    /// Current-based leaky integrate-and-fire neurons with exponential synapses.
    IfCurrExp(NeuronParams),
    /// Units emitting spikes at fixed times.
    SpikeSourceArray { spike_times: Vec<f64> },
}

impl Default for NeuronModel {
    fn default() -> Self {
        NeuronModel::IfCurrExp(NeuronParams::default())
    }
}

/// How the units of two populations are paired by a projection.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Connector {
    /// The k-th source unit to the k-th target unit; sizes must match.
    OneToOne,
    /// Every source unit to every target unit.
    AllToAll,
}

/// A simulation engine hosting the circuits.
///
/// Failures are reported as [`CircuitError::Engine`] and are forwarded
/// unchanged by the blocks.
pub trait Engine {
    /// Allocate a population of `size` units.
    fn create_population(&mut self, size: usize, model: &NeuronModel) -> Result<Population, CircuitError>;

    /// Create an addressable view over some units of a population.
    fn create_population_view(
        &mut self,
        population: &Population,
        indices: &[usize],
    ) -> Result<Population, CircuitError>;

    /// Register a projection between two populations.
    fn create_connection(
        &mut self,
        source: &Population,
        target: &Population,
        connector: Connector,
        synapse: &Synapse,
        polarity: Polarity,
    ) -> Result<(), CircuitError>;

    /// Create a static synapse value.
    fn create_static_synapse(&self, weight: f64, delay: f64) -> Result<Synapse, CircuitError> {
        Synapse::build(weight, delay)
    }
}
