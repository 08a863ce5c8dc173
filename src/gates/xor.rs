//! Exclusive OR over several inputs, with mutual inhibition between lines.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::multiple::Multiple;
use crate::topology::{create_connections, PopulationRef, Topology};

use super::create_neurons;

/// An exclusive gate over `n_inputs` lines.
///
/// Input neuron i excites output neuron i and inhibits every other output,
/// so output i fires only when line i is the only active one.
#[derive(Debug, Clone)]
pub struct Xor {
    params: CircuitParams,
    inputs: Population,
    outputs: Population,
    counters: Counters,
    delay: f64,
}

impl Xor {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n_inputs: usize) -> Result<Self, CircuitError> {
        if n_inputs == 0 {
            return Err(CircuitError::InvalidParameter(
                "A XOR gate needs at least one input".to_string(),
            ));
        }
        let synapse = params.synapse()?;
        let inputs = create_neurons(engine, params, n_inputs)?;
        let outputs = create_neurons(engine, params, n_inputs)?;
        let (inputs_ref, outputs_ref) = (PopulationRef::from(inputs), PopulationRef::from(outputs));

        let mut created = create_connections(
            engine,
            &inputs_ref,
            &outputs_ref,
            &synapse,
            Topology::OneToOne,
            Polarity::Excitatory,
            None,
            None,
        )?;
        for i in 0..n_inputs {
            let others: Vec<usize> = (0..n_inputs).filter(|&j| j != i).collect();
            created += create_connections(
                engine,
                &inputs_ref,
                &outputs_ref,
                &synapse,
                Topology::AllToAll,
                Polarity::Inhibitory,
                Some(&[i]),
                Some(&others),
            )?;
        }

        Ok(Xor {
            params: *params,
            inputs,
            outputs,
            counters: Counters {
                neurons: 2 * n_inputs,
                internal_connections: created,
                ..Default::default()
            },
            delay: synapse.delay(),
        })
    }

    /// Returns the number of input lines.
    pub fn n_inputs(&self) -> usize {
        self.inputs.size()
    }
}

impl Component for Xor {
    fn name(&self) -> &'static str {
        "XOR gate"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.delay
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::Item(self.inputs)
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::Item(self.outputs)
    }

    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let created = wiring.connect_into(
            engine,
            &self.inputs.into(),
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
            &self.outputs.into(),
            &synapse,
            wiring.polarity_or(Polarity::Excitatory),
        )?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

/// An array of XOR gates with the same number of inputs.
pub type MultipleXor = Multiple<Xor>;

impl MultipleXor {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n: usize,
        n_inputs: usize,
    ) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| Xor::new(engine, params, n_inputs))
    }
}
