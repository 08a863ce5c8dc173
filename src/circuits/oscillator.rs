//! Synchronous and asynchronous oscillators.
use crate::component::{Capability, Component, Counters, Wiring};
use crate::config::CircuitParams;
use crate::connection::Polarity;
use crate::engine::{Engine, NeuronModel, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;
use crate::gates::create_neurons;
use crate::multiple::Multiple;
use crate::topology::{create_connections, PopulationRef, Topology};

/// A free-running clock: high for `n_period` steps, then low for `n_period` steps.
///
/// A spike source fills an input neuron during the first `n_period` steps,
/// and the pulse train then circulates between the input and the output
/// neuron through synapses of delay `n_period`.
#[derive(Debug, Clone)]
pub struct SyncOscillator {
    params: CircuitParams,
    n_period: usize,
    set_source: Population,
    input: Population,
    output: Population,
    counters: Counters,
    delay: f64,
}

impl SyncOscillator {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n_period: usize) -> Result<Self, CircuitError> {
        if n_period == 0 {
            return Err(CircuitError::InvalidParameter(
                "The period of an oscillator must be positive".to_string(),
            ));
        }
        let synapse = params.synapse()?;
        let ring_synapse = engine.create_static_synapse(1.0, n_period as f64)?;

        let spike_times = (1..=n_period).map(|t| t as f64).collect();
        let set_source = engine.create_population(1, &NeuronModel::SpikeSourceArray { spike_times })?;
        let input = create_neurons(engine, params, 1)?;
        let output = create_neurons(engine, params, 1)?;
        let (source_ref, input_ref, output_ref) = (
            PopulationRef::from(set_source),
            PopulationRef::from(input),
            PopulationRef::from(output),
        );

        let mut created = 0;
        for (from, to, synapse) in [
            (&source_ref, &input_ref, &synapse),
            (&input_ref, &output_ref, &ring_synapse),
            (&output_ref, &input_ref, &ring_synapse),
        ] {
            created += create_connections(
                engine,
                from,
                to,
                synapse,
                Topology::AllToAll,
                Polarity::Excitatory,
                None,
                None,
            )?;
        }

        Ok(SyncOscillator {
            params: *params,
            n_period,
            set_source,
            input,
            output,
            counters: Counters {
                neurons: 3,
                internal_connections: created,
                ..Default::default()
            },
            delay: synapse.delay() + n_period as f64,
        })
    }

    /// Returns the number of steps of each half period.
    pub fn n_period(&self) -> usize {
        self.n_period
    }

    /// Returns the clock neuron.
    pub fn output_neuron(&self) -> Population {
        self.output
    }
}

impl Component for SyncOscillator {
    fn name(&self) -> &'static str {
        "synchronous oscillator"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.delay
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::empty()
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::Item(self.output)
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

/// A toggle: every signal spike flips the activity between the input and the cycle neuron.
#[derive(Debug, Clone)]
pub struct AsyncOscillator {
    params: CircuitParams,
    input: Population,
    cycle: Population,
    counters: Counters,
}

impl AsyncOscillator {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams) -> Result<Self, CircuitError> {
        let synapse = params.synapse()?;
        let input = create_neurons(engine, params, 1)?;
        let cycle = create_neurons(engine, params, 1)?;
        let (input_ref, cycle_ref) = (PopulationRef::from(input), PopulationRef::from(cycle));

        let mut created = 0;
        for (from, to, polarity) in [
            (&input_ref, &cycle_ref, Polarity::Excitatory),
            (&cycle_ref, &input_ref, Polarity::Inhibitory),
            (&input_ref, &input_ref, Polarity::Inhibitory),
            (&cycle_ref, &cycle_ref, Polarity::Excitatory),
        ] {
            created += create_connections(
                engine,
                from,
                to,
                &synapse,
                Topology::AllToAll,
                polarity,
                None,
                None,
            )?;
        }

        Ok(AsyncOscillator {
            params: *params,
            input,
            cycle,
            counters: Counters {
                neurons: 2,
                internal_connections: created,
                ..Default::default()
            },
        })
    }

    /// Returns the input and the cycle neuron.
    pub fn signal_neurons(&self) -> Nested<Population> {
        Nested::items(vec![self.input, self.cycle])
    }

    /// Returns the neuron staying active between two signal spikes.
    pub fn cycle_neuron(&self) -> Population {
        self.cycle
    }
}

impl Component for AsyncOscillator {
    fn name(&self) -> &'static str {
        "asynchronous oscillator"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        0.0
    }

    fn input_neurons(&self) -> Nested<Population> {
        self.signal_neurons()
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::items(vec![self.input, self.cycle])
    }

    /// The signal reaches the input neuron with the requested polarity and the cycle neuron with the opposite one.
    fn connect_signal(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let mut created = wiring.connect_into(engine, &self.input.into(), &synapse, polarity)?;
        created += wiring.connect_into(engine, &self.cycle.into(), &synapse, polarity.inverse())?;

        self.counters.record(Capability::Signal, created);
        Ok(created)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        let synapse = wiring.synapse_or(self.params.synapse()?);
        let polarity = wiring.polarity_or(Polarity::Excitatory);

        let mut created = wiring.connect_from(engine, &self.input.into(), &synapse, polarity)?;
        created += wiring.connect_from(engine, &self.cycle.into(), &synapse, polarity)?;

        self.counters.record(Capability::Outputs, created);
        Ok(created)
    }
}

/// An array of asynchronous oscillators.
pub type MultipleAsyncOscillator = Multiple<AsyncOscillator>;

impl MultipleAsyncOscillator {
    pub fn new(engine: &mut dyn Engine, params: &CircuitParams, n: usize) -> Result<Self, CircuitError> {
        Multiple::build(n, |_| AsyncOscillator::new(engine, params))
    }

    /// Returns the input and cycle neurons, one pair per oscillator.
    pub fn signal_neurons(&self) -> Nested<Population> {
        Nested::list(self.components().iter().map(AsyncOscillator::signal_neurons))
    }
}
