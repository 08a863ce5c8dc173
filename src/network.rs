//! The in-memory reference engine.
//!
//! [`Network`] records populations, views and projections, expands every
//! projection into neuron-level [`Connection`]s and runs an idealized
//! discrete-time simulation: a neuron fires at a step iff the signed sum of the
//! weights reaching it at that step attains [`FIRING_THRESHOLD`]. Spike sources
//! fire at their scheduled steps. Membrane dynamics are not modeled.
//!
//! ```
//! use rusty_blocks::connection::Polarity;
//! use rusty_blocks::engine::{Connector, Engine, NeuronModel};
//! use rusty_blocks::network::Network;
//!
//! let mut network = Network::new();
//! let sources = network.create_spike_sources(&[vec![1.0, 4.0]]).unwrap();
//! let synapse = network.create_static_synapse(1.0, 2.0).unwrap();
//! let relay = network.create_population(1, &NeuronModel::default()).unwrap();
//! network
//!     .create_connection(&sources[0], &relay, Connector::OneToOne, &synapse, Polarity::Excitatory)
//!     .unwrap();
//!
//! let record = network.simulate(10.0).unwrap();
//! assert_eq!(record.firing_times(&relay), vec![vec![3.0, 6.0]]);
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, Polarity, Synapse};
use crate::engine::{Connector, Engine, NeuronModel, Population};
use crate::error::CircuitError;
use crate::{FIRING_THRESHOLD, POTENTIAL_TOLERANCE};

/// A projection as registered by a component, before its expansion into connections.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Projection {
    pub source: Population,
    pub target: Population,
    pub connector: Connector,
    pub synapse: Synapse,
    pub polarity: Polarity,
}

/// The in-memory engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Network {
    /// Time step of the simulation, also the minimum connection delay.
    timestep: f64,
    /// Model of every neuron, by neuron ID.
    models: Vec<NeuronModel>,
    /// Neuron IDs of every population or view, by population ID.
    populations: Vec<Vec<usize>>,
    projections: Vec<Projection>,
    connections: Vec<Connection>,
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

impl Network {
    /// Create an empty network with a unit time step.
    pub fn new() -> Self {
        Network {
            timestep: 1.0,
            models: vec![],
            populations: vec![],
            projections: vec![],
            connections: vec![],
        }
    }

    /// Create an empty network with the given time step.
    pub fn with_timestep(timestep: f64) -> Result<Self, CircuitError> {
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(CircuitError::InvalidParameter(format!(
                "The time step must be positive, got {}",
                timestep
            )));
        }
        Ok(Network {
            timestep,
            ..Network::new()
        })
    }

    /// Returns the time step of the simulation.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Returns the number of neurons in the network, spike sources included.
    pub fn num_neurons(&self) -> usize {
        self.models.len()
    }

    /// Returns the number of neuron-level connections.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns the number of registered projections.
    pub fn num_projections(&self) -> usize {
        self.projections.len()
    }

    /// Returns the neuron-level connections, in registration order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the registered projections, in registration order.
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// Returns the neuron IDs of a population, or an empty slice if the engine did not issue it.
    pub fn neuron_ids(&self, population: &Population) -> &[usize] {
        self.populations
            .get(population.id())
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the model of a neuron.
    pub fn model(&self, neuron_id: usize) -> Option<&NeuronModel> {
        self.models.get(neuron_id)
    }

    /// Create one single-unit spike source per list of spike times.
    pub fn create_spike_sources(&mut self, spike_times: &[Vec<f64>]) -> Result<Vec<Population>, CircuitError> {
        spike_times
            .iter()
            .map(|times| {
                self.create_population(
                    1,
                    &NeuronModel::SpikeSourceArray {
                        spike_times: times.clone(),
                    },
                )
            })
            .collect()
    }

    fn resolve(&self, population: &Population) -> Result<&[usize], CircuitError> {
        match self.populations.get(population.id()) {
            Some(ids) if ids.len() == population.size() => Ok(ids),
            _ => Err(CircuitError::Engine(format!(
                "Population {} of size {} was not issued by this network",
                population.id(),
                population.size()
            ))),
        }
    }

    fn to_step(&self, time: f64) -> Result<usize, CircuitError> {
        if !(time.is_finite() && time >= 0.0) {
            return Err(CircuitError::Engine(format!(
                "Invalid time {} in the simulation",
                time
            )));
        }
        Ok((time / self.timestep).round() as usize)
    }

    /// Run the idealized simulation over `[0, duration]`.
    pub fn simulate(&self, duration: f64) -> Result<SpikeRecord, CircuitError> {
        let num_steps = self.to_step(duration)? + 1;
        let num_neurons = self.num_neurons();
        log::info!(
            "Simulating {} neurons and {} connections over {} steps",
            num_neurons,
            self.num_connections(),
            num_steps
        );

        let mut outputs: Vec<Vec<(usize, usize, f64)>> = vec![vec![]; num_neurons];
        for connection in self.connections.iter() {
            outputs[connection.source_id()].push((
                connection.target_id(),
                self.to_step(connection.delay())?,
                connection.signed_weight(),
            ));
        }

        let mut scheduled: Vec<HashSet<usize>> = vec![HashSet::new(); num_neurons];
        for (id, model) in self.models.iter().enumerate() {
            if let NeuronModel::SpikeSourceArray { spike_times } = model {
                for &time in spike_times.iter() {
                    scheduled[id].insert(self.to_step(time)?);
                }
            }
        }

        let mut potentials = vec![vec![0.0; num_neurons]; num_steps];
        let mut spike_trains: Vec<Vec<f64>> = vec![vec![]; num_neurons];
        for step in 0..num_steps {
            for id in 0..num_neurons {
                let fires = match &self.models[id] {
                    NeuronModel::SpikeSourceArray { .. } => scheduled[id].contains(&step),
                    NeuronModel::IfCurrExp(_) => {
                        potentials[step][id] >= FIRING_THRESHOLD - POTENTIAL_TOLERANCE
                    }
                };
                if !fires {
                    continue;
                }
                spike_trains[id].push(step as f64 * self.timestep);
                for &(target_id, delay, weight) in outputs[id].iter() {
                    if let Some(row) = potentials.get_mut(step + delay) {
                        row[target_id] += weight;
                    }
                }
            }
        }

        log::debug!(
            "Simulation done: {} spikes",
            spike_trains.iter().map(Vec::len).sum::<usize>()
        );
        Ok(SpikeRecord {
            populations: self.populations.clone(),
            spike_trains,
        })
    }

    /// Save the network to a JSON file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CircuitError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| CircuitError::IOError(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, CircuitError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| CircuitError::IOError(e.to_string()))
    }
}

impl Engine for Network {
    fn create_population(&mut self, size: usize, model: &NeuronModel) -> Result<Population, CircuitError> {
        if size == 0 {
            return Err(CircuitError::InvalidParameter(
                "A population needs at least one unit".to_string(),
            ));
        }
        if let NeuronModel::SpikeSourceArray { spike_times } = model {
            if let Some(time) = spike_times.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
                return Err(CircuitError::Engine(format!("Invalid spike time {}", time)));
            }
        }
        let first = self.models.len();
        self.models.extend(std::iter::repeat(model.clone()).take(size));
        self.populations.push((first..first + size).collect());
        log::trace!("Population {} of {} units created", self.populations.len() - 1, size);
        Ok(Population::new(self.populations.len() - 1, size))
    }

    fn create_population_view(
        &mut self,
        population: &Population,
        indices: &[usize],
    ) -> Result<Population, CircuitError> {
        let ids = self.resolve(population)?;
        let view = indices
            .iter()
            .map(|&i| {
                ids.get(i).copied().ok_or_else(|| {
                    CircuitError::Engine(format!(
                        "Index {} out of a population of {} units",
                        i,
                        ids.len()
                    ))
                })
            })
            .collect::<Result<Vec<usize>, CircuitError>>()?;
        if view.is_empty() {
            return Err(CircuitError::Engine("A view needs at least one unit".to_string()));
        }
        self.populations.push(view);
        Ok(Population::new(self.populations.len() - 1, indices.len()))
    }

    fn create_connection(
        &mut self,
        source: &Population,
        target: &Population,
        connector: Connector,
        synapse: &Synapse,
        polarity: Polarity,
    ) -> Result<(), CircuitError> {
        if synapse.delay() < self.timestep {
            return Err(CircuitError::Engine(format!(
                "Synapse delay {} is below the time step {}",
                synapse.delay(),
                self.timestep
            )));
        }
        let sources = self.resolve(source)?;
        let targets = self.resolve(target)?;
        let pairs: Vec<(usize, usize)> = match connector {
            Connector::AllToAll => iproduct!(sources.iter().copied(), targets.iter().copied()).collect(),
            Connector::OneToOne => {
                if sources.len() != targets.len() {
                    return Err(CircuitError::Engine(format!(
                        "One-to-one projection between populations of {} and {} units",
                        sources.len(),
                        targets.len()
                    )));
                }
                sources.iter().copied().zip(targets.iter().copied()).collect()
            }
        };

        self.connections.extend(
            pairs
                .into_iter()
                .map(|(source_id, target_id)| Connection::new(source_id, target_id, synapse, polarity)),
        );
        self.projections.push(Projection {
            source: *source,
            target: *target,
            connector,
            synapse: *synapse,
            polarity,
        });
        Ok(())
    }
}

/// The spikes emitted during a simulation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SpikeRecord {
    populations: Vec<Vec<usize>>,
    spike_trains: Vec<Vec<f64>>,
}

impl SpikeRecord {
    /// Returns the firing times of every neuron, by neuron ID.
    pub fn spike_trains(&self) -> &[Vec<f64>] {
        &self.spike_trains
    }

    /// Returns the firing times of each unit of a population.
    pub fn firing_times(&self, population: &Population) -> Vec<Vec<f64>> {
        self.populations
            .get(population.id())
            .map(|ids| ids.iter().map(|&id| self.spike_trains[id].clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populations_and_views() {
        let mut network = Network::new();
        let model = NeuronModel::default();
        let first = network.create_population(3, &model).unwrap();
        let second = network.create_population(2, &model).unwrap();
        assert_eq!(network.num_neurons(), 5);
        assert_eq!(network.neuron_ids(&second), &[3, 4]);

        let view = network.create_population_view(&first, &[2, 0]).unwrap();
        assert_eq!(view.size(), 2);
        assert_eq!(network.neuron_ids(&view), &[2, 0]);
        assert!(matches!(
            network.create_population_view(&first, &[3]),
            Err(CircuitError::Engine(_))
        ));
        assert!(matches!(
            network.create_population(0, &model),
            Err(CircuitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_connections() {
        let mut network = Network::new();
        let model = NeuronModel::default();
        let source = network.create_population(2, &model).unwrap();
        let target = network.create_population(3, &model).unwrap();
        let synapse = Synapse::build(0.5, 2.0).unwrap();

        network
            .create_connection(&source, &target, Connector::AllToAll, &synapse, Polarity::Inhibitory)
            .unwrap();
        assert_eq!(network.num_connections(), 6);
        assert_eq!(network.num_projections(), 1);
        assert!(network.connections().iter().all(|c| c.signed_weight() == -0.5));

        assert!(matches!(
            network.create_connection(&source, &target, Connector::OneToOne, &synapse, Polarity::Excitatory),
            Err(CircuitError::Engine(_))
        ));
        let fast = Synapse::build(1.0, 0.5).unwrap();
        assert!(matches!(
            network.create_connection(&source, &source, Connector::OneToOne, &fast, Polarity::Excitatory),
            Err(CircuitError::Engine(_))
        ));
        assert_eq!(network.num_connections(), 6);
    }

    #[test]
    fn test_unknown_population() {
        let mut network = Network::new();
        let synapse = Synapse::build(1.0, 1.0).unwrap();
        let ghost = Population::new(7, 1);
        assert!(network.neuron_ids(&ghost).is_empty());
        assert!(matches!(
            network.create_connection(&ghost, &ghost, Connector::OneToOne, &synapse, Polarity::Excitatory),
            Err(CircuitError::Engine(_))
        ));
    }

    #[test]
    fn test_threshold_summation() {
        let mut network = Network::new();
        let sources = network
            .create_spike_sources(&[vec![2.0, 6.0], vec![2.0, 9.0], vec![6.0]])
            .unwrap();
        let target = network.create_population(1, &NeuronModel::default()).unwrap();
        let half = Synapse::build(0.5, 1.0).unwrap();
        network
            .create_connection(&sources[0], &target, Connector::OneToOne, &half, Polarity::Excitatory)
            .unwrap();
        network
            .create_connection(&sources[1], &target, Connector::OneToOne, &half, Polarity::Excitatory)
            .unwrap();
        network
            .create_connection(&sources[2], &target, Connector::OneToOne, &half, Polarity::Inhibitory)
            .unwrap();

        let record = network.simulate(12.0).unwrap();
        // Coincident halves sum to the threshold; an inhibition cancels one of them.
        assert_eq!(record.firing_times(&target), vec![vec![3.0]]);
        assert_eq!(record.spike_trains()[0], vec![2.0, 6.0]);
    }

    #[test]
    fn test_timestep() {
        let mut network = Network::with_timestep(0.5).unwrap();
        let sources = network.create_spike_sources(&[vec![1.0]]).unwrap();
        let target = network.create_population(1, &NeuronModel::default()).unwrap();
        let synapse = Synapse::build(1.0, 0.5).unwrap();
        network
            .create_connection(&sources[0], &target, Connector::OneToOne, &synapse, Polarity::Excitatory)
            .unwrap();
        let record = network.simulate(3.0).unwrap();
        assert_eq!(record.firing_times(&target), vec![vec![1.5]]);
        assert!(Network::with_timestep(0.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let mut network = Network::new();
        let sources = network.create_spike_sources(&[vec![1.0]]).unwrap();
        let target = network.create_population(2, &NeuronModel::default()).unwrap();
        network
            .create_connection(
                &sources[0],
                &target,
                Connector::AllToAll,
                &Synapse::build(1.0, 1.0).unwrap(),
                Polarity::Excitatory,
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        network.save_to(&path).unwrap();
        assert_eq!(Network::load_from(&path).unwrap(), network);
    }
}
