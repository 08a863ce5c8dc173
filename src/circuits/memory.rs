//! Addressable memory of D latches, selected by a decoder.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::{AndType, MultipleNot};

use super::encoder::bits_for;
use super::{Decoder, MultipleLatchD};

/// An addressable memory of `n_dirs` words of `n_bits` bits.
///
/// The signal lines carry an address in binary, address 0 meaning no access:
/// word `a` is written when address `a + 1` is presented along with the data
/// lines. A decoder selects the row of D latches to write, and one NOT gate per
/// bit column provides the negated data shared by all rows. Latch `a * n_bits + b`
/// holds bit `b` of word `a`.
#[derive(Debug, Clone)]
pub struct Memory {
    params: CircuitParams,
    n_dirs: usize,
    n_bits: usize,
    decoder: Decoder,
    not_gates: MultipleNot,
    latches: MultipleLatchD,
    synapse_delay: f64,
    counters: Counters,
}

impl Memory {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n_dirs: usize,
        n_bits: usize,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        if n_dirs == 0 || n_bits == 0 {
            return Err(CircuitError::InvalidParameter(format!(
                "A memory cannot hold {} words of {} bits",
                n_dirs, n_bits
            )));
        }
        let decoder = Decoder::new(engine, params, bits_for(n_dirs + 1), and_type)?;
        let not_gates = MultipleNot::new(engine, params, n_bits)?;
        let mut latches = MultipleLatchD::new(engine, params, n_dirs * n_bits, and_type, false)?;

        let selectors = decoder.output_neurons().flatten();
        for (word, selector) in selectors.iter().skip(1).take(n_dirs).enumerate() {
            let selector = (*selector).into();
            let row = (word * n_bits..(word + 1) * n_bits).collect();
            latches.connect_signal(engine, &Wiring::new(&selector).with_components(row))?;
        }
        for (bit, not_gate) in not_gates.components().iter().enumerate() {
            let negated = not_gate.output_neuron().into();
            let column = (0..n_dirs).map(|word| word * n_bits + bit).collect();
            latches.connect_not_data(engine, &Wiring::new(&negated).with_components(column))?;
        }

        let mut counters = Counters::default();
        counters.absorb(decoder.counters());
        counters.absorb(not_gates.counters());
        counters.absorb(latches.counters());
        log::debug!(
            "Memory of {} words of {} bits built: {} neurons, {} internal connections",
            n_dirs,
            n_bits,
            counters.neurons,
            counters.internal_connections
        );

        Ok(Memory {
            params: *params,
            n_dirs,
            n_bits,
            decoder,
            not_gates,
            latches,
            synapse_delay: params.synapse()?.delay(),
            counters,
        })
    }

    /// Returns the number of words.
    pub fn n_dirs(&self) -> usize {
        self.n_dirs
    }

    /// Returns the number of bits per word.
    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// Returns the number of address lines.
    pub fn n_signals(&self) -> usize {
        self.decoder.n_inputs()
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn not_gates(&self) -> &MultipleNot {
        &self.not_gates
    }

    pub fn latches(&self) -> &MultipleLatchD {
        &self.latches
    }

    /// Returns the output neuron of bit `bit` of word `word`.
    pub fn cell(&self, word: usize, bit: usize) -> Result<Population, CircuitError> {
        if word >= self.n_dirs || bit >= self.n_bits {
            return Err(CircuitError::OutOfBounds(format!(
                "No cell ({}, {}) in a memory of {} words of {} bits",
                word, bit, self.n_dirs, self.n_bits
            )));
        }
        Ok(self.latches.components()[word * self.n_bits + bit].latch().output_neuron())
    }

    /// Returns the neurons to feed with constant spikes.
    pub fn supplied_neurons(&self) -> Nested<Population> {
        let mut supplied = vec![self.decoder.supplied_neurons(), self.not_gates.output_neurons()];
        if self.and_type() == AndType::Fast {
            supplied.extend(self.latches.components().iter().map(|latch| latch.supplied_neurons()));
        }
        Nested::list(supplied)
    }

    fn and_type(&self) -> AndType {
        self.decoder.and_gates().and_type()
    }

    fn write_lag(&self) -> f64 {
        self.decoder.delay() + self.synapse_delay
    }
}

impl Component for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.write_lag() + self.latches.delay()
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::list(vec![
            self.decoder.input_neurons(),
            self.not_gates.input_neurons(),
            self.latches.input_neurons(),
        ])
    }

    fn output_neurons(&self) -> Nested<Population> {
        self.latches.output_neurons()
    }

    /// Wire the address lines, line j taking the j-th entry of a per-target source index set.
    fn connect_signal(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.decoder.connect_inputs(engine, wiring)?;
        self.counters.record(Capability::Signal, created);
        Ok(created)
    }

    /// Wire the data lines, bit b taking the b-th entry of a per-target source index set.
    fn connect_data(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        wiring.source.check_arity(self.n_bits)?;
        wiring.target.check_arity(self.n_bits)?;
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        // Both data paths meet the decoder output at the latches.
        let negated = synapse.delayed(self.decoder.delay() - self.not_gates.delay())?;
        let negated = Wiring {
            components: None,
            ..wiring.redirected(Some(negated), polarity.inverse())
        };
        let mut created = self.not_gates.connect_inputs(engine, &negated)?;

        let direct = synapse.delayed(self.write_lag())?;
        for bit in 0..self.n_bits {
            let column = (0..self.n_dirs).map(|word| word * self.n_bits + bit).collect();
            let line = wiring
                .for_target(bit)?
                .redirected(Some(direct), polarity)
                .with_components(column);
            created += self.latches.connect_data(engine, &line)?;
        }

        self.counters.record(Capability::Data, created);
        Ok(created)
    }

    /// Feed the NOT gate biases of the decoder and the data columns and, for fast AND gates, their inhibition.
    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let bias = Wiring {
            components: None,
            ..wiring.redirected(Some(synapse), wiring.polarity_or(Polarity::Excitatory))
        };

        let mut created = self.decoder.connect_constant_spikes(engine, &bias)?;
        created += self.not_gates.connect_constant_spikes(engine, &bias)?;
        if self.and_type() == AndType::Fast {
            created += self.latches.connect_constant_spikes(engine, &bias)?;
        }

        self.counters.record(Capability::ConstantSpikes, created);
        Ok(created)
    }

    /// Wire the cells selected by `wiring.components` (all of them by default).
    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.latches.connect_outputs(engine, wiring)?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_structure() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let memory = Memory::new(&mut network, &params, 3, 2, AndType::Fast).unwrap();

        assert_eq!(memory.n_signals(), 2);
        assert_eq!(memory.latches().len(), 6);
        // Decoder 6, NOT gates 2, latches 6 x 3.
        assert_eq!(memory.total_neurons(), 26);
        // Decoder 4, latches 6 x 3, signals 3 x 4, negated data 2 x 3.
        assert_eq!(memory.total_internal_connections(), 40);
        assert_eq!(network.num_neurons(), 26);
        assert_eq!(network.num_connections(), 40);
    }

    #[test]
    fn test_invalid_size() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        assert!(matches!(
            Memory::new(&mut network, &params, 0, 4, AndType::Classic),
            Err(CircuitError::InvalidParameter(_))
        ));
        let memory = Memory::new(&mut network, &params, 1, 1, AndType::Classic).unwrap();
        assert!(matches!(memory.cell(1, 0), Err(CircuitError::OutOfBounds(_))));
    }
}
