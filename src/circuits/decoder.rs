//! Binary decoder from address lines to one AND gate per address.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::{Polarity, Synapse};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::{AndType, MultipleAnd, MultipleNot};

/// Returns the positions in `0..n_outputs` whose bit `bit` equals `value`.
pub(crate) fn truth_table_column(n_outputs: usize, bit: usize, value: bool) -> Vec<usize> {
    (0..n_outputs).filter(|k| (k >> bit) & 1 == usize::from(value)).collect()
}

/// A binary decoder from `n_inputs` lines to `2^n_inputs` outputs.
///
/// Output k is an AND gate receiving line j directly when bit j of k is set,
/// and the negation of line j (through NOT gate j) otherwise. The NOT gates
/// need a constant bias, wired with [`Component::connect_constant_spikes`].
#[derive(Debug, Clone)]
pub struct Decoder {
    params: CircuitParams,
    not_gates: MultipleNot,
    and_gates: MultipleAnd,
    synapse_delay: f64,
    counters: Counters,
}

impl Decoder {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n_inputs: usize,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        Decoder::build(engine, params, n_inputs, n_inputs, and_type)
    }

    /// Build a decoder whose AND gates take `and_inputs >= n_inputs` inputs, the extra ones being left to the caller.
    pub(crate) fn build(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n_inputs: usize,
        and_inputs: usize,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        if n_inputs == 0 || n_inputs >= usize::BITS as usize {
            return Err(CircuitError::InvalidParameter(format!(
                "A decoder cannot have {} inputs",
                n_inputs
            )));
        }
        let n_outputs = 1 << n_inputs;
        let not_gates = MultipleNot::new(engine, params, n_inputs)?;
        let mut and_gates = MultipleAnd::new(engine, params, n_outputs, and_inputs, and_type)?;

        for (bit, not_gate) in not_gates.components().iter().enumerate() {
            let negated = not_gate.output_neuron().into();
            let wiring = Wiring::new(&negated).with_components(truth_table_column(n_outputs, bit, false));
            and_gates.connect_inputs(engine, &wiring)?;
        }

        let mut counters = Counters::default();
        counters.absorb(not_gates.counters());
        counters.absorb(and_gates.counters());
        log::debug!(
            "Decoder with {} inputs built: {} neurons, {} internal connections",
            n_inputs,
            counters.neurons,
            counters.internal_connections
        );

        Ok(Decoder {
            params: *params,
            not_gates,
            and_gates,
            synapse_delay: params.synapse()?.delay(),
            counters,
        })
    }

    /// Returns the number of input lines.
    pub fn n_inputs(&self) -> usize {
        self.not_gates.len()
    }

    /// Returns the number of outputs.
    pub fn n_outputs(&self) -> usize {
        self.and_gates.len()
    }

    pub fn not_gates(&self) -> &MultipleNot {
        &self.not_gates
    }

    pub fn and_gates(&self) -> &MultipleAnd {
        &self.and_gates
    }

    pub(crate) fn and_gates_mut(&mut self) -> &mut MultipleAnd {
        &mut self.and_gates
    }

    /// Returns the extra delay of a direct input so that it meets the NOT gate path.
    pub fn direct_lag(&self) -> f64 {
        self.not_gates.delay() + self.synapse_delay
    }

    /// Returns the neurons to feed with constant spikes.
    pub fn supplied_neurons(&self) -> Nested<Population> {
        match self.and_gates.and_type() {
            AndType::Classic => self.not_gates.output_neurons(),
            AndType::Fast => Nested::list(vec![
                self.not_gates.output_neurons(),
                self.and_gates.inhibited_neurons(),
            ]),
        }
    }
}

impl Component for Decoder {
    fn name(&self) -> &'static str {
        "decoder"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.direct_lag() + self.and_gates.delay()
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::list(vec![self.not_gates.input_neurons(), self.and_gates.input_neurons()])
    }

    fn output_neurons(&self) -> Nested<Population> {
        self.and_gates.output_neurons()
    }

    /// Wire the input lines, line j taking the j-th entry of a per-target source index set.
    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let n_inputs = self.n_inputs();
        wiring.source.check_arity(n_inputs)?;
        wiring.target.check_arity(n_inputs)?;
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let negated = Wiring {
            components: None,
            ..wiring.redirected(Some(synapse), polarity.inverse())
        };
        let mut created = self.not_gates.connect_inputs(engine, &negated)?;

        let direct = synapse.delayed(self.direct_lag())?;
        for bit in 0..n_inputs {
            let line = wiring.for_target(bit)?.redirected(Some(direct), polarity);
            let line = line.with_components(truth_table_column(self.n_outputs(), bit, true));
            created += self.and_gates.connect_inputs(engine, &line)?;
        }

        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    /// Feed the NOT gate biases and, for fast AND gates, their inhibition.
    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let bias = Wiring {
            components: None,
            ..wiring.redirected(Some(synapse), polarity)
        };
        let mut created = self.not_gates.connect_constant_spikes(engine, &bias)?;
        if self.and_gates.and_type() == AndType::Fast {
            let weight = self.and_gates.components()[0].inhibition_synapse().weight();
            let inhibition = Wiring {
                components: None,
                ..wiring.redirected(Some(Synapse::build(weight, synapse.delay())?), polarity.inverse())
            };
            created += self.and_gates.connect_inhibition(engine, &inhibition)?;
        }

        self.counters.record(Capability::ConstantSpikes, created);
        Ok(created)
    }

    /// Wire the outputs selected by `wiring.components` (all of them by default).
    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.and_gates.connect_outputs(engine, wiring)?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::topology::PopulationRef;

    #[test]
    fn test_truth_table_column() {
        assert_eq!(truth_table_column(8, 0, true), vec![1, 3, 5, 7]);
        assert_eq!(truth_table_column(8, 1, false), vec![0, 1, 4, 5]);
        assert_eq!(truth_table_column(8, 2, true), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_connection_counts() {
        for (and_type, per_and) in [(AndType::Classic, 7), (AndType::Fast, 5)] {
            let mut network = Network::new();
            let params = CircuitParams::default();
            let n = 3;
            let mut decoder = Decoder::new(&mut network, &params, n, and_type).unwrap();
            let constant = network.create_spike_sources(&[vec![1.0], vec![2.0]]).unwrap();
            let lines = network.create_spike_sources(&[vec![5.0], vec![5.0], vec![5.0]]).unwrap();

            decoder
                .connect_constant_spikes(&mut network, &Wiring::new(&constant.into()))
                .unwrap();
            let lines = PopulationRef::from(lines);
            let wiring = Wiring::new(&lines).with_source(vec![vec![0], vec![1], vec![2]]);
            decoder.connect_inputs(&mut network, &wiring).unwrap();

            // Per AND gate: n inputs, internal wiring and, for fast gates, 2 inhibitions.
            let expected = (1 << n) * per_and + 3 * n;
            assert_eq!(decoder.counters().connections(), expected);
            assert_eq!(network.num_connections(), expected);
        }
    }

    #[test]
    fn test_per_line_arity() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut decoder = Decoder::new(&mut network, &params, 2, AndType::Fast).unwrap();
        let lines = PopulationRef::from(network.create_spike_sources(&[vec![5.0], vec![5.0]]).unwrap());

        let wiring = Wiring::new(&lines).with_source(vec![vec![0], vec![1], vec![1]]);
        assert!(matches!(
            decoder.connect_inputs(&mut network, &wiring),
            Err(CircuitError::ArityMismatch(_))
        ));
        assert_eq!(decoder.total_input_connections(), 0);
    }
}
