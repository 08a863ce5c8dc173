//! NOT gate: a neuron firing on its bias unless an input inhibits it.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::multiple::Multiple;

use super::create_neurons;

/// A NOT gate.
///
/// A single neuron kept firing by a constant excitatory bias, silenced by its
/// inhibitory inputs. It needs [`Component::connect_constant_spikes`] to work.
#[derive(Debug, Clone)]
pub struct Not {
    params: CircuitParams,
    output: Population,
    counters: Counters,
}

impl Not {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams) -> Result<Self, CircuitError> {
        let output = create_neurons(engine, params, 1)?;
        Ok(Not {
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

    fn wire_in(
        &mut self,
        engine: &mut dyn Engine,
        wiring: &Wiring,
        capability: Capability,
        polarity: Polarity,
    ) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let created = wiring.connect_into(engine, &self.output.into(), &synapse, wiring.polarity_or(polarity))?;
        self.counters.record(capability, created);
        Ok(created)
    }
}

impl Component for Not {
    fn name(&self) -> &'static str {
        "NOT gate"
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

    /// Inputs are inhibitory by default.
    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_in(engine, wiring, Capability::Inputs, Polarity::Inhibitory)
    }

    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_in(engine, wiring, Capability::ConstantSpikes, Polarity::Excitatory)
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

/// An array of NOT gates.
pub type MultipleNot = Multiple<Not>;

impl MultipleNot {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n: usize) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| Not::new(engine, params))
    }
}
