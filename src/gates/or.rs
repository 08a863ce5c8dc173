//! OR gate: a neuron firing whenever any of its inputs fires.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::multiple::Multiple;

use super::create_neurons;

/// An OR gate: a single neuron firing whenever any of its inputs does.
#[derive(Debug, Clone)]
pub struct Or {
    params: CircuitParams,
    output: Population,
    counters: Counters,
}

impl Or {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams) -> Result<Self, CircuitError> {
        let output = create_neurons(engine, params, 1)?;
        Ok(Or {
            params: *params,
            output,
            counters: Counters {
                neurons: 1,
                ..Default::default()
            },
        })
    }

    /// Returns the single neuron of the gate.
    pub fn output_neuron(&self) -> Population {
        self.output
    }
}

impl Component for Or {
    fn name(&self) -> &'static str {
        "OR gate"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        0.0
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::Item(self.output)
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::Item(self.output)
    }

    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let created = wiring.connect_into(
            engine,
            &self.output.into(),
            &synapse,
            wiring.polarity_or(Polarity::Excitatory),
        )?;
        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let created = wiring.connect_from(
            engine,
            &self.output.into(),
            &synapse,
            wiring.polarity_or(Polarity::Excitatory),
        )?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

/// An array of OR gates.
pub type MultipleOr = Multiple<Or>;

impl MultipleOr {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n: usize) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| Or::new(engine, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Synapse;
    use crate::network::Network;
    use crate::topology::PopulationRef;

    #[test]
    fn test_two_sources_through_custom_synapse() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut gate = Or::new(&mut network, &params).unwrap();
        let sources = PopulationRef::from(network.create_spike_sources(&[vec![2.0], vec![5.0]]).unwrap());

        let synapse = network.create_static_synapse(2.0, 1.0).unwrap();
        let wiring = Wiring::new(&sources).with_synapse(synapse);
        assert_eq!(gate.connect_inputs(&mut network, &wiring).unwrap(), 2);

        assert_eq!(gate.total_input_connections(), 2);
        assert_eq!(gate.total_neurons(), 1);
        assert!(network.connections().iter().all(|c| c.weight() == 2.0));

        let record = network.simulate(10.0).unwrap();
        assert_eq!(record.firing_times(&gate.output_neuron())[0], vec![3.0, 6.0]);
    }

    #[test]
    fn test_output_target_indexes() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut gate = Or::new(&mut network, &params).unwrap();
        let targets = PopulationRef::from(network.create_population(5, &params.neuron_model()).unwrap());

        let wiring = Wiring::new(&targets)
            .with_target(vec![1, 4])
            .with_synapse(Synapse::build(1.0, 2.0).unwrap());
        assert_eq!(gate.connect_outputs(&mut network, &wiring).unwrap(), 2);
        assert_eq!(gate.total_output_connections(), 2);
        assert!(network.connections().iter().all(|c| c.delay() == 2.0));
    }
}
