//! The contract shared by every gate and circuit.
//!
//! A component is built once against an engine, wiring its fixed internals,
//! and is then only extended by wiring calls. Each wiring call goes through one
//! of the [`Capability`] methods of [`Component`] with a [`Wiring`] bundle and
//! returns the number of connections it created.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connection::{Polarity, Synapse};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::topology::{create_connections, IndexSet, PopulationRef, Topology};

/// Neuron and connection bookkeeping of a component.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct Counters {
    pub neurons: usize,
    pub input_connections: usize,
    pub internal_connections: usize,
    pub output_connections: usize,
}

impl Counters {
    /// Account for a sub-component: its neurons and every connection it holds are internal here.
    pub fn absorb(&mut self, sub: &Counters) {
        self.neurons += sub.neurons;
        self.internal_connections +=
            sub.input_connections + sub.internal_connections + sub.output_connections;
    }

    /// Account for the connections created by a wiring call.
    pub fn record(&mut self, capability: Capability, created: usize) {
        match capability {
            Capability::Outputs => self.output_connections += created,
            _ => self.input_connections += created,
        }
    }

    /// Returns the total number of connections.
    pub fn connections(&self) -> usize {
        self.input_connections + self.internal_connections + self.output_connections
    }
}

/// The closed set of wiring operations a component may offer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Capability {
    Inputs,
    Outputs,
    Set,
    Reset,
    Signal,
    ConstantSpikes,
    Inhibition,
    Data,
    NotData,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Capability::Inputs => "connect_inputs",
            Capability::Outputs => "connect_outputs",
            Capability::Set => "connect_set",
            Capability::Reset => "connect_reset",
            Capability::Signal => "connect_signal",
            Capability::ConstantSpikes => "connect_constant_spikes",
            Capability::Inhibition => "connect_inhibition",
            Capability::Data => "connect_data",
            Capability::NotData => "connect_not_data",
        };
        write!(f, "{}", name)
    }
}

/// The arguments of a wiring call.
///
/// `population` is the external side of the call: the sender for input-like
/// capabilities, the receiver for [`Capability::Outputs`]. `source` selects
/// units on the sending side and `target` on the receiving side. Missing
/// synapse or polarity fall back to the defaults of the capability.
/// `components` only matters to arrays of components.
#[derive(Debug, Clone)]
pub struct Wiring<'a> {
    pub population: &'a PopulationRef,
    pub synapse: Option<Synapse>,
    pub topology: Topology,
    pub polarity: Option<Polarity>,
    pub source: IndexSet,
    pub target: IndexSet,
    pub components: Option<Vec<usize>>,
}

impl<'a> Wiring<'a> {
    /// Wire the whole population with every default.
    pub fn new(population: &'a PopulationRef) -> Self {
        Wiring {
            population,
            synapse: None,
            topology: Topology::default(),
            polarity: None,
            source: IndexSet::All,
            target: IndexSet::All,
            components: None,
        }
    }

    pub fn with_synapse(mut self, synapse: Synapse) -> Self {
        self.synapse = Some(synapse);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    pub fn with_source<I: Into<IndexSet>>(mut self, source: I) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_target<I: Into<IndexSet>>(mut self, target: I) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_components(mut self, components: Vec<usize>) -> Self {
        self.components = Some(components);
        self
    }

    /// Returns the same call with the synapse and polarity replaced.
    pub fn redirected(&self, synapse: Option<Synapse>, polarity: Polarity) -> Self {
        Wiring {
            synapse,
            polarity: Some(polarity),
            ..self.clone()
        }
    }

    /// The call to forward to the `position`-th targeted member of an array.
    pub fn for_target(&self, position: usize) -> Result<Self, CircuitError> {
        Ok(Wiring {
            population: self.population,
            synapse: self.synapse,
            topology: self.topology,
            polarity: self.polarity,
            source: self.source.for_target(position)?,
            target: self.target.for_target(position)?,
            components: None,
        })
    }

    /// Returns the synapse of the call, or `default` if none was given.
    pub fn synapse_or(&self, default: Synapse) -> Synapse {
        self.synapse.unwrap_or(default)
    }

    /// Returns the polarity of the call, or `default` if none was given.
    pub fn polarity_or(&self, default: Polarity) -> Polarity {
        self.polarity.unwrap_or(default)
    }

    /// Connect the selected units of the wired population into `target`.
    pub fn connect_into(
        &self,
        engine: &mut dyn Engine,
        target: &PopulationRef,
        synapse: &Synapse,
        polarity: Polarity,
    ) -> Result<usize, CircuitError> {
        create_connections(
            engine,
            self.population,
            target,
            synapse,
            self.topology,
            polarity,
            self.source.as_subset()?,
            self.target.as_subset()?,
        )
    }

    /// Connect the selected units of `source` into the wired population.
    pub fn connect_from(
        &self,
        engine: &mut dyn Engine,
        source: &PopulationRef,
        synapse: &Synapse,
        polarity: Polarity,
    ) -> Result<usize, CircuitError> {
        create_connections(
            engine,
            source,
            self.population,
            synapse,
            self.topology,
            polarity,
            self.source.as_subset()?,
            self.target.as_subset()?,
        )
    }
}

/// The error returned by capabilities a component does not offer.
pub fn unsupported(component: &str, capability: Capability) -> CircuitError {
    CircuitError::UnsupportedOperation(format!("{} is not offered by {}", capability, component))
}

/// A gate or circuit built from spiking neurons.
///
/// Capabilities default to [`CircuitError::UnsupportedOperation`]; every
/// implemented one returns the number of connections it created and adds it
/// to the matching counter.
pub trait Component {
    /// Returns a short name of the component, used in messages.
    fn name(&self) -> &'static str;

    /// Returns the bookkeeping of the component.
    fn counters(&self) -> &Counters;

    /// Returns the worst-case latency between an input and the resulting output.
    fn delay(&self) -> f64;

    fn total_neurons(&self) -> usize {
        self.counters().neurons
    }

    fn total_input_connections(&self) -> usize {
        self.counters().input_connections
    }

    fn total_internal_connections(&self) -> usize {
        self.counters().internal_connections
    }

    fn total_output_connections(&self) -> usize {
        self.counters().output_connections
    }

    /// Returns the neurons receiving the inputs, structured like the component.
    fn input_neurons(&self) -> Nested<Population>;

    /// Returns the neurons emitting the outputs, structured like the component.
    fn output_neurons(&self) -> Nested<Population>;

    fn connect_inputs(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Inputs))
    }

    fn connect_outputs(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Outputs))
    }

    fn connect_set(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Set))
    }

    fn connect_reset(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Reset))
    }

    fn connect_signal(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Signal))
    }

    fn connect_constant_spikes(
        &mut self,
        _engine: &mut dyn Engine,
        _wiring: &Wiring,
    ) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::ConstantSpikes))
    }

    fn connect_inhibition(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Inhibition))
    }

    fn connect_data(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::Data))
    }

    fn connect_not_data(&mut self, _engine: &mut dyn Engine, _wiring: &Wiring) -> Result<usize, CircuitError> {
        Err(unsupported(self.name(), Capability::NotData))
    }

    /// Invoke a capability by name.
    fn connect(
        &mut self,
        engine: &mut dyn Engine,
        capability: Capability,
        wiring: &Wiring,
    ) -> Result<usize, CircuitError> {
        match capability {
            Capability::Inputs => self.connect_inputs(engine, wiring),
            Capability::Outputs => self.connect_outputs(engine, wiring),
            Capability::Set => self.connect_set(engine, wiring),
            Capability::Reset => self.connect_reset(engine, wiring),
            Capability::Signal => self.connect_signal(engine, wiring),
            Capability::ConstantSpikes => self.connect_constant_spikes(engine, wiring),
            Capability::Inhibition => self.connect_inhibition(engine, wiring),
            Capability::Data => self.connect_data(engine, wiring),
            Capability::NotData => self.connect_not_data(engine, wiring),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink {
        counters: Counters,
    }

    impl Component for Sink {
        fn name(&self) -> &'static str {
            "sink"
        }

        fn counters(&self) -> &Counters {
            &self.counters
        }

        fn delay(&self) -> f64 {
            0.0
        }

        fn input_neurons(&self) -> Nested<Population> {
            Nested::empty()
        }

        fn output_neurons(&self) -> Nested<Population> {
            Nested::empty()
        }
    }

    #[test]
    fn test_unsupported_by_default() {
        let mut network = crate::network::Network::new();
        let population = PopulationRef::from(Population::new(0, 1));
        let wiring = Wiring::new(&population);
        let mut sink = Sink {
            counters: Counters::default(),
        };

        for capability in [Capability::Set, Capability::Inhibition, Capability::NotData] {
            assert_eq!(
                sink.connect(&mut network, capability, &wiring),
                Err(CircuitError::UnsupportedOperation(format!(
                    "{} is not offered by sink",
                    capability
                )))
            );
        }
        assert_eq!(sink.total_input_connections(), 0);
    }

    #[test]
    fn test_counters() {
        let mut counters = Counters::default();
        counters.record(Capability::Inputs, 3);
        counters.record(Capability::Outputs, 2);
        counters.record(Capability::ConstantSpikes, 1);
        assert_eq!(counters.input_connections, 4);
        assert_eq!(counters.output_connections, 2);

        let mut parent = Counters {
            neurons: 1,
            ..Default::default()
        };
        parent.absorb(&counters);
        assert_eq!(parent.neurons, 1);
        assert_eq!(parent.internal_connections, 6);
        assert_eq!(parent.connections(), 6);
    }

    #[test]
    fn test_wiring_for_target() {
        let population = PopulationRef::from(Population::new(0, 4));
        let wiring = Wiring::new(&population)
            .with_source(vec![vec![0], vec![1, 2]])
            .with_target(vec![3])
            .with_components(vec![1, 0]);

        let second = wiring.for_target(1).unwrap();
        assert_eq!(second.source, IndexSet::Shared(vec![1, 2]));
        assert_eq!(second.target, IndexSet::Shared(vec![3]));
        assert_eq!(second.components, None);
        assert!(matches!(wiring.for_target(2), Err(CircuitError::ArityMismatch(_))));
    }
}
