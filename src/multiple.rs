//! Arrays of identical components wired as one.
//!
//! Each primitive module provides the constructor of its array (e.g.
//! [`crate::gates::MultipleAnd::new`]); every capability of the array
//! broadcasts to its members.

use crate::broadcast::broadcast;
use crate::component::{Capability, Component, Counters, Wiring};
use crate::engine::{Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;

/// A homogeneous array of components.
#[derive(Debug, Clone)]
pub struct Multiple<T> {
    components: Vec<T>,
    counters: Counters,
    delay: f64,
}

impl<T: Component> Multiple<T> {
    /// Build an array of `n` components, the i-th one being returned by `build_one(i)`.
    pub fn build<F>(n: usize, mut build_one: F) -> Result<Self, CircuitError>
    where
        F: FnMut(usize) -> Result<T, CircuitError>,
    {
        if n == 0 {
            return Err(CircuitError::InvalidParameter(
                "An array must hold at least one component".to_string(),
            ));
        }
        let components = (0..n).map(&mut build_one).collect::<Result<Vec<T>, CircuitError>>()?;

        let mut counters = Counters::default();
        for component in components.iter() {
            counters.neurons += component.total_neurons();
            counters.internal_connections += component.total_internal_connections();
        }
        let delay = components[0].delay();

        Ok(Multiple {
            components,
            counters,
            delay,
        })
    }

    /// Returns the members of the array.
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the array has no member, which never happens once built.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn broadcast(
        &mut self,
        engine: &mut dyn Engine,
        capability: Capability,
        wiring: &Wiring,
    ) -> Result<usize, CircuitError> {
        let created = broadcast(engine, capability, &mut self.components, wiring)?;
        self.counters.record(capability, created);
        Ok(created)
    }
}

impl<T: Component> Component for Multiple<T> {
    fn name(&self) -> &'static str {
        "component array"
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn delay(&self) -> f64 {
        self.delay
    }

    fn input_neurons(&self) -> Nested<Population> {
        Nested::list(self.components.iter().map(|component| component.input_neurons()))
    }

    fn output_neurons(&self) -> Nested<Population> {
        Nested::list(self.components.iter().map(|component| component.output_neurons()))
    }

    fn connect_inputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Inputs, wiring)
    }

    fn connect_outputs(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Outputs, wiring)
    }

    fn connect_set(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Set, wiring)
    }

    fn connect_reset(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Reset, wiring)
    }

    fn connect_signal(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Signal, wiring)
    }

    fn connect_constant_spikes(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::ConstantSpikes, wiring)
    }

    fn connect_inhibition(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Inhibition, wiring)
    }

    fn connect_data(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::Data, wiring)
    }

    fn connect_not_data(&mut self, engine: &mut dyn Engine, wiring: &Wiring) -> Result<usize, CircuitError> {
        self.broadcast(engine, Capability::NotData, wiring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitParams;
    use crate::gates::{And, AndType, MultipleAnd, MultipleOr, Or};
    use crate::network::Network;
    use crate::topology::PopulationRef;

    #[test]
    fn test_empty_array() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        assert!(matches!(
            MultipleOr::new(&mut network, &params, 0),
            Err(CircuitError::InvalidParameter(_))
        ));
        assert_eq!(network.num_neurons(), 0);
    }

    #[test]
    fn test_counters_sum_members() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let ands = MultipleAnd::new(&mut network, &params, 3, 4, AndType::Classic).unwrap();
        let single = And::new(&mut network, &params, 4, AndType::Classic).unwrap();

        assert_eq!(ands.len(), 3);
        assert_eq!(ands.total_neurons(), 3 * single.total_neurons());
        assert_eq!(ands.total_internal_connections(), 3 * single.total_internal_connections());
        assert_eq!(ands.delay(), single.delay());
    }

    #[test]
    fn test_broadcast_counts() {
        let mut network = Network::new();
        let params = CircuitParams::default();
        let mut ors = MultipleOr::new(&mut network, &params, 3).unwrap();
        let inputs = network
            .create_spike_sources(&[vec![1.0], vec![2.0], vec![3.0]])
            .unwrap();
        let inputs = PopulationRef::from(inputs);

        let wiring = Wiring::new(&inputs).with_source(vec![vec![0], vec![1], vec![2]]);
        assert_eq!(ors.connect_inputs(&mut network, &wiring).unwrap(), 3);

        let wiring = Wiring::new(&inputs).with_components(vec![2]);
        assert_eq!(ors.connect_inputs(&mut network, &wiring).unwrap(), 3);

        assert_eq!(ors.total_input_connections(), 6);
        assert_eq!(
            ors.components().iter().map(Or::total_input_connections).collect::<Vec<usize>>(),
            vec![1, 1, 4]
        );

        let output = PopulationRef::from(network.create_population(1, &params.neuron_model()).unwrap());
        assert_eq!(ors.connect_outputs(&mut network, &Wiring::new(&output)).unwrap(), 3);
        assert_eq!(ors.total_output_connections(), 3);
        assert_eq!(ors.output_neurons().flatten().len(), 3);
        // Wiring a single member still goes through the array counters.
        assert_eq!(ors.counters().connections(), network.num_connections());
    }
}
