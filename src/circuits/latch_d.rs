//! D latch storing its data input whenever the signal fires.
use crate::component::{unsupported, Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::{Polarity, Synapse};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::{AndType, MultipleAnd, Not};
use crate::multiple::Multiple;

use super::LatchSr;

/// A D latch: stores the data line whenever the signal line fires.
///
/// AND #0 (data and signal) sets an SR latch, AND #1 (negated data and
/// signal) resets it. The negated data comes from an internal NOT gate, or
/// from the caller through [`Component::connect_not_data`] when the latch is
/// built without one. Paths bypassing the NOT gate are delayed to meet it.
#[derive(Debug, Clone)]
pub struct LatchD {
    params: CircuitParams,
    not_gate: Option<Not>,
    and_gates: MultipleAnd,
    latch: LatchSr,
    synapse_delay: f64,
    counters: Counters,
}

impl LatchD {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        and_type: AndType,
        include_not: bool,
    ) -> Result<Self, CircuitError> {
        let not_gate = match include_not {
            true => Some(Not::new(engine, params)?),
            false => None,
        };
        let mut and_gates = MultipleAnd::new(engine, params, 2, 2, and_type)?;
        let mut latch = LatchSr::new(engine, params)?;

        let set_and = and_gates.components()[0].output_neuron();
        let reset_and = and_gates.components()[1].output_neuron();
        latch.connect_set(engine, &Wiring::new(&set_and.into()))?;
        latch.connect_reset(engine, &Wiring::new(&reset_and.into()))?;
        if let Some(not_gate) = not_gate.as_ref() {
            let negated = not_gate.output_neuron().into();
            and_gates.connect_inputs(engine, &Wiring::new(&negated).with_components(vec![1]))?;
        }

        let mut counters = Counters::default();
        if let Some(not_gate) = not_gate.as_ref() {
            counters.absorb(not_gate.counters());
        }
        counters.absorb(and_gates.counters());
        counters.absorb(latch.counters());

        Ok(LatchD {
            params: *params,
            not_gate,
            and_gates,
            latch,
            synapse_delay: params.synapse()?.delay(),
            counters,
        })
    }

    /// Returns the lag applied to the paths bypassing the NOT gate.
    pub fn data_lag(&self) -> f64 {
        match &self.not_gate {
            Some(not_gate) => not_gate.delay() + self.synapse_delay,
            None => 0.0,
        }
    }

    pub fn not_gate(&self) -> Option<&Not> {
        self.not_gate.as_ref()
    }

    pub fn and_gates(&self) -> &MultipleAnd {
        &self.and_gates
    }

    pub fn latch(&self) -> &LatchSr {
        &self.latch
    }

    /// Returns the neurons to feed with constant spikes.
    pub fn supplied_neurons(&self) -> Nested<Population> {
        let mut supplied = vec![];
        if let Some(not_gate) = &self.not_gate {
            supplied.push(not_gate.output_neurons());
        }
        if self.and_gates.and_type() == AndType::Fast {
            supplied.push(self.and_gates.inhibited_neurons());
        }
        Nested::list(supplied)
    }

    fn wire_and_inputs(
        &mut self,
        engine: &mut dyn Engine,
        wiring: &Wiring,
        components: Option<Vec<usize>>,
    ) -> Result<usize, CircuitError> {
        // A single latch takes no per-target index sets.
        wiring.source.as_subset()?;
        wiring.target.as_subset()?;
        let synapse = wiring.synapse_or(self.params.synapse()?).delayed(self.data_lag())?;
        let wiring = Wiring {
            components,
            ..wiring.redirected(Some(synapse), wiring.polarity_or(Polarity::Excitatory))
        };
        self.and_gates.connect_inputs(engine, &wiring)
    }
}

impl Component for LatchD {
    fn name(&self) -> &'static str {
        "D latch"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.data_lag() + self.and_gates.delay() + self.synapse_delay + self.latch.delay()
    }

    fn input_neurons(&self) -> Nested<Population> {
        match &self.not_gate {
            Some(not_gate) => Nested::list(vec![not_gate.input_neurons(), self.and_gates.input_neurons()]),
            None => self.and_gates.input_neurons(),
        }
    }

    fn output_neurons(&self) -> Nested<Population> {
        self.latch.output_neurons()
    }

    fn connect_data(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let mut created = 0;
        if let Some(not_gate) = self.not_gate.as_mut() {
            let synapse = wiring.synapse_or(self.params.synapse()?);
            let polarity = wiring.polarity_or(Polarity::Excitatory).inverse();
            created += not_gate.connect_inputs(engine, &wiring.redirected(Some(synapse), polarity))?;
        }
        created += self.wire_and_inputs(engine, wiring, Some(vec![0]))?;

        self.counters.record(Capability::Data, created);
        Ok(created)
    }

    fn connect_not_data(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.wire_and_inputs(engine, wiring, Some(vec![1]))?;
        self.counters.record(Capability::NotData, created);
        Ok(created)
    }

    fn connect_signal(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.wire_and_inputs(engine, wiring, None)?;
        self.counters.record(Capability::Signal, created);
        Ok(created)
    }

    /// Feed the NOT gate bias and, for fast AND gates, their inhibition.
    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let fast = self.and_gates.and_type() == AndType::Fast;
        if self.not_gate.is_none() && !fast {
            return Err(unsupported("D latch without NOT gate nor fast AND gates", Capability::ConstantSpikes));
        }
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let mut created = 0;
        if let Some(not_gate) = self.not_gate.as_mut() {
            created += not_gate.connect_constant_spikes(engine, &wiring.redirected(Some(synapse), polarity))?;
        }
        if fast {
            let weight = self.and_gates.components()[0].inhibition_synapse().weight();
            let inhibition = Synapse::build(weight, synapse.delay())?;
            let wiring = Wiring {
                components: None,
                ..wiring.redirected(Some(inhibition), polarity.inverse())
            };
            created += self.and_gates.connect_inhibition(engine, &wiring)?;
        }

        self.counters.record(Capability::ConstantSpikes, created);
        Ok(created)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let created = self.latch.connect_outputs(engine, wiring)?;
        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

/// An array of D latches sharing the build variant.
pub type MultipleLatchD = Multiple<LatchD>;

impl MultipleLatchD {
    pub fn new(
        engine: &mut dyn Engine,
        params: &CircuitParams,
        n: usize,
        and_type: AndType,
        include_not: bool,
    ) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| LatchD::new(engine, params, and_type, include_not))
    }
}
