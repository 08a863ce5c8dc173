//! Binary encoder from one-hot lines to OR gates per bit.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::MultipleOr;

/// Returns the number of bits needed to tell `n` values apart.
pub(crate) fn bits_for(n: usize) -> usize {
    match n {
        0 | 1 => 0,
        n => (usize::BITS - (n - 1).leading_zeros()) as usize,
    }
}

/// A binary encoder from `n_inputs` one-hot lines to `ceil(log2(n_inputs))` outputs.
///
/// Output j is an OR gate receiving every line whose position has bit j set.
#[derive(Debug, Clone)]
pub struct Encoder {
    params: CircuitParams,
    n_inputs: usize,
    or_gates: MultipleOr,
    counters: Counters,
}

impl Encoder {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n_inputs: usize) -> Result<Self, CircuitError> {
        if n_inputs < 2 {
            return Err(CircuitError::InvalidParameter(
                "An encoder needs at least two inputs".to_string(),
            ));
        }
        let or_gates = MultipleOr::new(engine, params, bits_for(n_inputs))?;
        let mut counters = Counters::default();
        counters.absorb(or_gates.counters());

        Ok(Encoder {
            params: *params,
            n_inputs,
            or_gates,
            counters,
        })
    }

    /// Returns the number of input lines.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    pub fn or_gates(&self) -> &MultipleOr {
        &self.or_gates
    }
}

impl Component for Encoder {
    fn name(&self) -> &'static str {
        "encoder"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.or_gates.delay()
    }

    fn input_neurons(&self) -> Nested<Population> {
        self.or_gates.input_neurons()
    }

    fn output_neurons(&self) -> Nested<Population> {
        self.or_gates.output_neurons()
    }

    /// Wire the input lines, line i taking the i-th entry of a per-target source index set.
    ///
    /// Line 0 has no set bit and is left unconnected.
    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        wiring.source.check_arity(self.n_inputs)?;
        wiring.target.as_subset()?;
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);
        let n_outputs = self.or_gates.len();

        let mut created = 0;
        for line in 1..self.n_inputs {
            let outputs: Vec<usize> = (0..n_outputs)
                .filter(|&bit| (line >> bit) & 1 == 1)
                .collect();
            let line_wiring = Wiring {
                source: wiring.source.for_target(line)?,
                components: Some(outputs),
                ..wiring.redirected(Some(synapse), polarity)
            };
            created += self.or_gates.connect_inputs(engine, &line_wiring)?;
        }

        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.or_gates.connect_outputs(engine, wiring)?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}
