//! SR latch made of a single self-exciting neuron.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::create_neurons;
use crate::multiple::Multiple;
use crate::topology::{create_connections, PopulationRef, Topology};

/// An SR latch: a self-exciting neuron, switched on by set inputs and off by reset inputs.
#[derive(Debug, Clone)]
pub struct LatchSr {
    params: CircuitParams,
    output: Population,
    counters: Counters,
}

impl LatchSr {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams) -> Result<Self, CircuitError> {
        let output = create_neurons(engine, params, 1)?;
        let output_ref = PopulationRef::from(output);
        let created = create_connections(
            engine,
            &output_ref,
            &output_ref,
            &params.synapse()?,
            Topology::AllToAll,
            Polarity::Excitatory,
            None,
            None,
        )?;

        Ok(LatchSr {
            params: *params,
            output,
            counters: Counters {
                neurons: 1,
                internal_connections: created,
                ..Default::default()
            },
        })
    }

    /// Returns the neuron holding the state.
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

impl Component for LatchSr {
    fn name(&self) -> &'static str {
        "SR latch"
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

    fn connect_set(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_in(engine, wiring, Capability::Set, Polarity::Excitatory)
    }

    fn connect_reset(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_in(engine, wiring, Capability::Reset, Polarity::Inhibitory)
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

/// An array of SR latches.
pub type MultipleLatchSr = Multiple<LatchSr>;

impl MultipleLatchSr {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n: usize) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| LatchSr::new(engine, params))
    }
}
