//! Detection of the rising and falling edges of a spike signal.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::{Polarity, Synapse};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::{AndType, MultipleAnd, Not};
use crate::POTENTIAL_TOLERANCE;

/// An edge detector.
///
/// AND #0 fires on rising edges of the input: the input now and its negation
/// one step earlier. AND #1 fires on falling edges: the negation now and the
/// input one step earlier. The NOT gate needs a constant bias (and the fast
/// ANDs their inhibition), both wired with [`Component::connect_constant_spikes`].
#[derive(Debug, Clone)]
pub struct FlankDetector {
    params: CircuitParams,
    not_gate: Not,
    and_gates: MultipleAnd,
    synapse_delay: f64,
    input_delay: Option<f64>,
    counters: Counters,
}

impl FlankDetector {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, and_type: AndType) -> Result<Self, CircuitError> {
        let not_gate = Not::new(engine, params)?;
        let mut and_gates = MultipleAnd::new(engine, params, 2, 2, and_type)?;
        and_gates.connect_inputs(engine, &Wiring::new(&not_gate.output_neuron().into()))?;

        let mut counters = Counters::default();
        counters.absorb(not_gate.counters());
        counters.absorb(and_gates.counters());

        Ok(FlankDetector {
            params: *params,
            not_gate,
            and_gates,
            synapse_delay: params.synapse()?.delay(),
            input_delay: None,
            counters,
        })
    }

    /// Returns the delay of the input synapses, the default one until the inputs are wired.
    pub fn input_delay(&self) -> f64 {
        self.input_delay.unwrap_or(self.synapse_delay)
    }

    /// Returns the latency of rising edges, through the direct path.
    pub fn rising_delay(&self) -> f64 {
        self.input_delay() + self.and_gates.delay()
    }

    /// Returns the latency of falling edges, through the NOT gate.
    pub fn falling_delay(&self) -> f64 {
        self.not_gate.delay() + self.input_delay() + self.synapse_delay + self.and_gates.delay()
    }

    pub fn not_gate(&self) -> &Not {
        &self.not_gate
    }

    pub fn and_gates(&self) -> &MultipleAnd {
        &self.and_gates
    }

    /// Returns the neurons to feed with constant spikes.
    pub fn supplied_neurons(&self) -> Nested<Population> {
        match self.and_gates.and_type() {
            AndType::Classic => self.not_gate.output_neurons(),
            AndType::Fast => Nested::list(vec![
                self.not_gate.output_neurons(),
                self.and_gates.inhibited_neurons(),
            ]),
        }
    }

    /// Wire the rising-edge output.
    pub fn connect_rising_edge(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_out(engine, wiring, Some(vec![0]))
    }

    /// Wire the falling-edge output.
    pub fn connect_falling_edge(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_out(engine, wiring, Some(vec![1]))
    }

    fn wire_out(
        &mut self,
        engine: &mut dyn Engine,
        wiring: &Wiring,
        edges: Option<Vec<usize>>,
    ) -> Result<usize, CircuitError> {
        let wiring = Wiring {
            components: edges,
            ..wiring.clone()
        };
        let created = self.and_gates.connect_outputs(engine, &wiring)?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

impl Component for FlankDetector {
    fn name(&self) -> &'static str {
        "flank detector"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Returns the larger of the rising and falling latencies.
    fn delay(&self) -> f64 {
        self.rising_delay().max(self.falling_delay())
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::list(vec![self.not_gate.input_neurons(), self.and_gates.input_neurons()])
    }

    fn output_neurons(&self) -> Nested<Population> {
        self.and_gates.output_neurons()
    }

    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);
        let not_delay = self.not_gate.delay();

        // Every input shares the delay the edge windows are aligned on.
        if let Some(delay) = self.input_delay {
            if (delay - synapse.delay()).abs() > POTENTIAL_TOLERANCE {
                return Err(CircuitError::InvalidParameter(format!(
                    "Flank detector inputs are already wired with delay {}, got {}",
                    delay,
                    synapse.delay()
                )));
            }
        }

        let mut created = self
            .not_gate
            .connect_inputs(engine, &wiring.redirected(Some(synapse), polarity.inverse()))?;

        let rising = synapse.delayed(not_delay)?;
        let rising_wiring = wiring.redirected(Some(rising), polarity).with_components(vec![0]);
        created += self.and_gates.connect_inputs(engine, &rising_wiring)?;

        // Two internal hops behind the rising path, to meet the NOT output of the next step.
        let falling = synapse.delayed(2.0 * self.synapse_delay + not_delay)?;
        let falling_wiring = wiring.redirected(Some(falling), polarity).with_components(vec![1]);
        created += self.and_gates.connect_inputs(engine, &falling_wiring)?;

        self.input_delay = Some(synapse.delay());
        self.counters.record(Capability::Inputs, created);
        Ok(created)
    }

    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let mut created = self
            .not_gate
            .connect_constant_spikes(engine, &wiring.redirected(Some(synapse), polarity))?;
        if self.and_gates.and_type() == AndType::Fast {
            let weight = self.and_gates.components()[0].inhibition_synapse().weight();
            let inhibition = Synapse::build(weight, synapse.delay())?;
            created += self
                .and_gates
                .connect_inhibition(engine, &wiring.redirected(Some(inhibition), polarity.inverse()))?;
        }

        self.counters.record(Capability::ConstantSpikes, created);
        Ok(created)
    }

    /// Wire both edge outputs.
    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.wire_out(engine, wiring, None)
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

        let classic = FlankDetector::new(&mut network, &params, AndType::Classic).unwrap();
        assert_eq!(classic.total_neurons(), 5);
        assert_eq!(classic.total_internal_connections(), 6);
        assert_eq!(classic.rising_delay(), 2.0);
        assert_eq!(classic.falling_delay(), 3.0);
        assert_eq!(classic.delay(), 3.0);
        assert_eq!(classic.supplied_neurons().flatten().len(), 1);

        let fast = FlankDetector::new(&mut network, &params, AndType::Fast).unwrap();
        assert_eq!(fast.total_neurons(), 3);
        assert_eq!(fast.total_internal_connections(), 2);
        assert_eq!(fast.rising_delay(), 1.0);
        assert_eq!(fast.falling_delay(), 2.0);
        assert_eq!(fast.supplied_neurons().flatten().len(), 3);
    }

    #[test]
    fn test_input_connections() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut detector = FlankDetector::new(&mut network, &params, AndType::Fast).unwrap();
        let input = network.create_spike_sources(&[vec![5.0]]).unwrap();
        let before = network.num_connections();

        assert_eq!(detector.connect_inputs(&mut network, &Wiring::new(&input.into())).unwrap(), 3);
        let added = &network.connections()[before..];
        assert_eq!(added[0].polarity(), Polarity::Inhibitory);
        assert_eq!(added[1].delay(), 1.0);
        assert_eq!(added[2].delay(), 3.0);
    }

    #[test]
    fn test_delays_follow_the_input_synapse() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut detector = FlankDetector::new(&mut network, &params, AndType::Classic).unwrap();
        let input = network.create_spike_sources(&[vec![5.0]]).unwrap();
        let slow = Synapse::build(1.0, 2.0).unwrap();
        let before = network.num_connections();

        detector
            .connect_inputs(&mut network, &Wiring::new(&input.clone().into()).with_synapse(slow))
            .unwrap();
        let added = &network.connections()[before..];
        assert_eq!(added.last().unwrap().delay(), 4.0 + detector.and_gates().delay());
        assert_eq!(detector.input_delay(), 2.0);
        assert_eq!(detector.rising_delay(), 3.0);
        assert_eq!(detector.falling_delay(), 4.0);

        let fast = Synapse::build(1.0, 1.0).unwrap();
        let error = detector
            .connect_inputs(&mut network, &Wiring::new(&input.into()).with_synapse(fast))
            .unwrap_err();
        assert!(matches!(error, CircuitError::InvalidParameter(_)));
    }
}
