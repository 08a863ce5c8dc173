//! Multiplexer and demultiplexer built on a decoder.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::{AndType, Or};
use crate::topology::PopulationRef;

use super::Decoder;

/// Direction of a [`MuxDemux`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MuxKind {
    /// Many data lines to one output.
    #[default]
    Mux,
    /// One data line to many outputs.
    Demux,
}

impl fmt::Display for MuxKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MuxKind::Mux => write!(f, "mux"),
            MuxKind::Demux => write!(f, "demux"),
        }
    }
}

impl FromStr for MuxKind {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mux" => Ok(MuxKind::Mux),
            "demux" => Ok(MuxKind::Demux),
            other => Err(CircuitError::Configuration(format!(
                "multiplexer build type {:?} is not implemented",
                other
            ))),
        }
    }
}

/// A multiplexer or demultiplexer driven by `n_select` select lines.
///
/// Both are a decoder whose AND gates take one more input, the data. A
/// multiplexer gives each AND gate its own data line and merges them into an
/// OR gate; a demultiplexer gives the same data line to every AND gate and
/// exposes their outputs.
#[derive(Debug, Clone)]
pub struct MuxDemux {
    params: CircuitParams,
    kind: MuxKind,
    decoder: Decoder,
    or_gate: Option<Or>,
    synapse_delay: f64,
    counters: Counters,
}

impl MuxDemux {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n_select: usize,
        kind: MuxKind,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        let decoder = Decoder::build(engine, params, n_select, n_select + 1, and_type)?;
        let mut counters = Counters::default();
        counters.absorb(decoder.counters());

        let or_gate = match kind {
            MuxKind::Mux => {
                let mut or_gate = Or::new(engine, params)?;
                let selected = PopulationRef::Concatenated(decoder.output_neurons().flatten());
                or_gate.connect_inputs(engine, &Wiring::new(&selected))?;
                counters.absorb(or_gate.counters());
                Some(or_gate)
            }
            MuxKind::Demux => None,
        };

        Ok(MuxDemux {
            params: *params,
            kind,
            decoder,
            or_gate,
            synapse_delay: params.synapse()?.delay(),
            counters,
        })
    }

    pub fn kind(&self) -> MuxKind {
        self.kind
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Returns the merging OR gate of a multiplexer.
    pub fn or_gate(&self) -> Option<&Or> {
        self.or_gate.as_ref()
    }

    /// Returns the neurons to feed with constant spikes.
    pub fn supplied_neurons(&self) -> Nested<Population> {
        self.decoder.supplied_neurons()
    }
}

impl Component for MuxDemux {
    fn name(&self) -> &'static str {
        match self.kind {
            MuxKind::Mux => "multiplexer",
            MuxKind::Demux => "demultiplexer",
        }
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        match &self.or_gate {
            Some(or_gate) => self.decoder.delay() + self.synapse_delay + or_gate.delay(),
            None => self.decoder.delay(),
        }
    }

    fn input_neurons(&self) -> Nested<Population> {
        self.decoder.input_neurons()
    }

    fn output_neurons(&self) -> Nested<Population> {
        match &self.or_gate {
            Some(or_gate) => or_gate.output_neurons(),
            None => self.decoder.output_neurons(),
        }
    }

    /// Wire the select lines, as the inputs of the decoder.
    fn connect_signal(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.decoder.connect_inputs(engine, wiring)?;
        self.counters.record(Capability::Signal, created);
        Ok(created)
    }

    /// Wire the data lines. A multiplexer expects one source index set per AND gate.
    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let data = synapse.delayed(self.decoder.direct_lag())?;
        let wiring = Wiring {
            components: None,
            ..wiring.redirected(Some(data), wiring.polarity_or(Polarity::Excitatory))
        };
        let created = self.decoder.and_gates_mut().connect_inputs(engine, &wiring)?;
        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.decoder.connect_constant_spikes(engine, wiring)?;
        self.counters.record(Capability::ConstantSpikes, created);
        Ok(created)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = match self.or_gate.as_mut() {
            Some(or_gate) => or_gate.connect_outputs(engine, wiring)?,
            None => self.decoder.connect_outputs(engine, wiring)?,
        };
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    fn wire(network: &mut Network, circuit: &mut MuxDemux, n_select: usize) {
        let constant = PopulationRef::from(network.create_spike_sources(&[vec![1.0], vec![2.0]]).unwrap());
        circuit
            .connect_constant_spikes(network, &Wiring::new(&constant))
            .unwrap();

        let select = PopulationRef::from(network.create_spike_sources(&vec![vec![]; n_select]).unwrap());
        let wiring = Wiring::new(&select).with_source((0..n_select).map(|i| vec![i]).collect::<Vec<_>>());
        circuit.connect_signal(network, &wiring).unwrap();

        let n_data = match circuit.kind() {
            MuxKind::Mux => 1 << n_select,
            MuxKind::Demux => 1,
        };
        let data = PopulationRef::from(network.create_spike_sources(&vec![vec![]; n_data]).unwrap());
        let wiring = match circuit.kind() {
            MuxKind::Mux => Wiring::new(&data).with_source((0..n_data).map(|i| vec![i]).collect::<Vec<_>>()),
            MuxKind::Demux => Wiring::new(&data),
        };
        circuit.connect_inputs(network, &wiring).unwrap();
    }

    #[test]
    fn test_connection_counts() {
        let n = 2;
        let expectations = [
            (MuxKind::Mux, AndType::Classic, (1 << n) * (2 * n + 4) + 3 * n),
            (MuxKind::Mux, AndType::Fast, (1 << n) * (n + 4) + 3 * n),
            (MuxKind::Demux, AndType::Classic, (1 << n) * (2 * n + 3) + 3 * n),
            (MuxKind::Demux, AndType::Fast, (1 << n) * (n + 3) + 3 * n),
        ];
        for (kind, and_type, expected) in expectations {
            let mut network = Network::new();
            let mut circuit = MuxDemux::new(&mut network, &CircuitParams::default(), n, kind, and_type).unwrap();
            wire(&mut network, &mut circuit, n);
            assert_eq!(circuit.counters().connections(), expected, "{} {}", kind, and_type);
            assert_eq!(network.num_connections(), expected);
        }
    }

    #[test]
    fn test_mux_kind_from_str() {
        assert_eq!("demux".parse::<MuxKind>(), Ok(MuxKind::Demux));
        assert!(matches!("switch".parse::<MuxKind>(), Err(CircuitError::Configuration(_))));
    }
}
