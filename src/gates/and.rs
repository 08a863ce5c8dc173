//! AND gate, in its classic (OR-inhibited) and fast (bias-inhibited) variants.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::component::{unsupported, Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::{Polarity, Synapse};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::multiple::Multiple;

use super::{create_neurons, Or};

/// How an AND gate discards incomplete input patterns.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AndType {
    /// An internal OR gate inhibits the output unless every input fired.
    #[default]
    Classic,
    /// A constant inhibitory bias, wired with [`Component::connect_inhibition`], does it without latency.
    Fast,
}

impl fmt::Display for AndType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AndType::Classic => write!(f, "classic"),
            AndType::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for AndType {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(AndType::Classic),
            "fast" => Ok(AndType::Fast),
            other => Err(CircuitError::Configuration(format!(
                "AND build type {:?} is not implemented",
                other
            ))),
        }
    }
}

/// An AND gate over `n_inputs` inputs.
///
/// The output neuron receives every input and an inhibition of weight
/// `n_inputs - 1`, so it only fires when all inputs coincide. In the classic
/// variant the inhibition comes from an internal OR gate and the direct inputs
/// are delayed to meet it. In the fast variant it is a constant bias provided
/// by the caller.
#[derive(Debug, Clone)]
pub struct And {
    params: CircuitParams,
    n_inputs: usize,
    and_type: AndType,
    or_gate: Option<Or>,
    output: Population,
    inhibition_synapse: Synapse,
    counters: Counters,
    delay: f64,
}

impl And {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n_inputs: usize,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        if n_inputs == 0 {
            return Err(CircuitError::InvalidParameter(
                "An AND gate needs at least one input".to_string(),
            ));
        }
        let inhibition_synapse = params.internal_synapse((n_inputs - 1) as f64)?;

        let mut counters = Counters::default();
        let mut or_gate = match and_type {
            AndType::Classic => Some(Or::new(engine, params)?),
            AndType::Fast => None,
        };
        let output = create_neurons(engine, params, 1)?;
        counters.neurons += 1;

        let delay = match or_gate.as_mut() {
            Some(or_gate) => {
                let output_ref = output.into();
                let wiring = Wiring::new(&output_ref)
                    .with_synapse(inhibition_synapse)
                    .with_polarity(Polarity::Inhibitory);
                or_gate.connect_outputs(engine, &wiring)?;
                counters.absorb(or_gate.counters());
                or_gate.delay() + inhibition_synapse.delay()
            }
            None => 0.0,
        };

        Ok(And {
            params: *params,
            n_inputs,
            and_type,
            or_gate,
            output,
            inhibition_synapse,
            counters,
            delay,
        })
    }

    /// Returns the number of inputs of the gate.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Returns the build variant of the gate.
    pub fn and_type(&self) -> AndType {
        self.and_type
    }

    /// Returns the internal OR gate of a classic gate.
    pub fn or_gate(&self) -> Option<&Or> {
        self.or_gate.as_ref()
    }

    /// Returns the output neuron.
    pub fn output_neuron(&self) -> Population {
        self.output
    }

    /// Returns the default synapse of the inhibition, of weight `n_inputs - 1`.
    pub fn inhibition_synapse(&self) -> Synapse {
        self.inhibition_synapse
    }

    /// Returns the neurons expecting the constant inhibition, none for a classic gate.
    pub fn inhibited_neurons(&self) -> Nested<Population> {
        match self.and_type {
            AndType::Classic => Nested::empty(),
            AndType::Fast => Nested::Item(self.output),
        }
    }
}

impl Component for And {
    fn name(&self) -> &'static str {
        match self.and_type {
            AndType::Classic => "classic AND gate",
            AndType::Fast => "fast AND gate",
        }
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.delay
    }

    fn input_neurons(&self) -> Nested<Population> {
        match &self.or_gate {
            Some(or_gate) => Nested::items(vec![or_gate.output_neuron(), self.output]),
            None => Nested::Item(self.output),
        }
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::Item(self.output)
    }

    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let mut created = 0;
        if let Some(or_gate) = self.or_gate.as_mut() {
            created += or_gate.connect_inputs(engine, &wiring.redirected(Some(synapse), polarity))?;
        }
        // The direct path waits for the OR inhibition.
        let direct = synapse.delayed(self.delay)?;
        created += wiring.connect_into(engine, &self.output.into(), &direct, polarity)?;

        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    /// Wire the constant inhibition of a fast gate. The weight of a custom synapse is not checked.
    fn connect_inhibition(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        if self.and_type == AndType::Classic {
            return Err(unsupported(self.name(), Capability::Inhibition));
        }
        let synapse = wiring.synapse_or(self.inhibition_synapse);
        let created = wiring.connect_into(
            engine,
            &self.output.into(),
            &synapse,
            wiring.polarity_or(Polarity::Inhibitory),
        )?;
        self.counters.record(Capability::Inhibition, created);
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

/// An array of AND gates sharing the number of inputs and the build variant.
pub type MultipleAnd = Multiple<And>;

impl MultipleAnd {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n: usize,
        n_inputs: usize,
        and_type: AndType,
    ) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| And::new(engine, params, n_inputs, and_type))
    }

    /// Returns the build variant of the gates.
    pub fn and_type(&self) -> AndType {
        self.components()[0].and_type()
    }

    /// Returns the neurons expecting the constant inhibition, one entry per gate.
    pub fn inhibited_neurons(&self) -> Nested<Population> {
        Nested::list(self.components().iter().map(And::inhibited_neurons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::topology::PopulationRef;

    #[test]
    fn test_classic_structure() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let gate = And::new(&mut network, &params, 3, AndType::Classic).unwrap();

        assert_eq!(gate.total_neurons(), 2);
        assert_eq!(gate.total_internal_connections(), 1);
        assert_eq!(gate.delay(), 1.0);
        assert_eq!(gate.inhibition_synapse().weight(), 2.0);
        assert!(gate.inhibited_neurons().is_empty());
        assert_eq!(gate.input_neurons().flatten().len(), 2);

        let connection = &network.connections()[0];
        assert_eq!(connection.polarity(), Polarity::Inhibitory);
        assert_eq!(connection.weight(), 2.0);
    }

    #[test]
    fn test_classic_inputs_reach_or_and_output() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut gate = And::new(&mut network, &params, 2, AndType::Classic).unwrap();
        let sources = PopulationRef::from(network.create_spike_sources(&[vec![1.0], vec![1.0]]).unwrap());

        assert_eq!(gate.connect_inputs(&mut network, &Wiring::new(&sources)).unwrap(), 4);
        assert_eq!(gate.total_input_connections(), 4);
        let delays: Vec<f64> = network.connections()[1..].iter().map(|c| c.delay()).collect();
        assert_eq!(delays, vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_inhibition_only_on_fast() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let bias = PopulationRef::from(network.create_spike_sources(&[vec![1.0]]).unwrap());

        let mut classic = And::new(&mut network, &params, 2, AndType::Classic).unwrap();
        assert!(matches!(
            classic.connect_inhibition(&mut network, &Wiring::new(&bias)),
            Err(CircuitError::UnsupportedOperation(_))
        ));

        let mut fast = And::new(&mut network, &params, 4, AndType::Fast).unwrap();
        assert_eq!(fast.total_neurons(), 1);
        assert_eq!(fast.delay(), 0.0);
        assert_eq!(fast.connect_inhibition(&mut network, &Wiring::new(&bias)).unwrap(), 1);
        let connection = network.connections().last().unwrap();
        assert_eq!(connection.weight(), 3.0);
        assert_eq!(connection.polarity(), Polarity::Inhibitory);
    }

    #[test]
    fn test_zero_inputs() {
        let mut network = Network::new();
        assert!(matches!(
            And::new(&mut network, &CircuitParams::default(), 0, AndType::Fast),
            Err(CircuitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_and_type_from_str() {
        assert_eq!("fast".parse::<AndType>(), Ok(AndType::Fast));
        assert_eq!("classic".parse::<AndType>(), Ok(AndType::Classic));
        assert!(matches!("lazy".parse::<AndType>(), Err(CircuitError::Configuration(_))));
    }

    #[test]
    fn test_multiple_inhibited_neurons() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let ands = MultipleAnd::new(&mut network, &params, 3, 2, AndType::Fast).unwrap();
        assert_eq!(ands.inhibited_neurons().flatten().len(), 3);
        assert_eq!(ands.and_type(), AndType::Fast);
    }
}
