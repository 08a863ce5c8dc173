//! Source of one spike per step, from a single spike latched by an SR latch.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, NeuronModel, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::topology::PopulationRef;

use super::LatchSr;

/// A source of one spike per time step, used as bias of NOT gates and fast AND gates.
///
/// A spike source firing once at t = 1 sets an SR latch. Wired together they
/// reach their targets at every step from `1 + delay` on.
#[derive(Debug, Clone)]
pub struct ConstantSource {
    params: CircuitParams,
    set_source: Population,
    latch: LatchSr,
    counters: Counters,
}

impl ConstantSource {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams) -> Result<Self, CircuitError> {
        let set_source = engine.create_population(1, &NeuronModel::SpikeSourceArray { spike_times: vec![1.0] })?;
        let mut latch = LatchSr::new(engine, params)?;
        latch.connect_set(engine, &Wiring::new(&set_source.into()))?;

        let mut counters = Counters {
            neurons: 1,
            ..Default::default()
        };
        counters.absorb(latch.counters());

        Ok(ConstantSource {
            params: *params,
            set_source,
            latch,
            counters,
        })
    }

    /// Returns the spike source setting the latch.
    pub fn set_source(&self) -> Population {
        self.set_source
    }

    /// Returns the latch.
    pub fn latch(&self) -> &LatchSr {
        &self.latch
    }

    /// Returns the two units to wire as a constant input of other components.
    pub fn sources(&self) -> PopulationRef {
        PopulationRef::Concatenated(vec![self.set_source, self.latch.output_neuron()])
    }
}

impl Component for ConstantSource {
    fn name(&self) -> &'static str {
        "constant spike source"
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
        Nested::items(vec![self.set_source, self.latch.output_neuron()])
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let created = wiring.connect_from(
            engine,
            &self.sources(),
            &synapse,
            wiring.polarity_or(Polarity::Excitatory),
        )?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_constant_output() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut source = ConstantSource::new(&mut network, &params).unwrap();
        assert_eq!(source.total_neurons(), 2);
        assert_eq!(source.total_internal_connections(), 2);

        let target = network.create_population(1, &params.neuron_model()).unwrap();
        assert_eq!(source.connect_outputs(&mut network, &Wiring::new(&target.into())).unwrap(), 2);
        assert_eq!(source.total_output_connections(), 2);

        let record = network.simulate(10.0).unwrap();
        let expected: Vec<f64> = (2..=10).map(f64::from).collect();
        assert_eq!(record.firing_times(&target)[0], expected);
    }

    #[test]
    fn test_sources_are_addressable() {
        let mut network = Network::new();
        let source = ConstantSource::new(&mut network, &CircuitParams::default()).unwrap();
        let sources = source.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources.element(&mut network, 0).unwrap(), source.set_source());
        assert_eq!(sources.element(&mut network, 1).unwrap(), source.latch().output_neuron());
    }
}
