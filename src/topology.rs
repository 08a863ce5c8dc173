//! Addressing of populations and enumeration of point-to-point connections.
//!
//! [`create_connections`] expands a source and a target selection into
//! individual unit-to-unit projections registered with the engine, following
//! a [`Topology`].

use std::fmt;
use std::str::FromStr;

use itertools::{iproduct, Itertools};
use serde::{Deserialize, Serialize};

use crate::connection::{Polarity, Synapse};
use crate::engine::{Connector, Engine, Population};
use crate::error::CircuitError;
use crate::flatten::Nested;

/// How the selected source and target units are paired.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Every selected source unit to every selected target unit.
    #[default]
    AllToAll,
    /// The k-th selected source unit to the k-th selected target unit.
    OneToOne,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topology::AllToAll => write!(f, "all_to_all"),
            Topology::OneToOne => write!(f, "one_to_one"),
        }
    }
}

impl FromStr for Topology {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_to_all" => Ok(Topology::AllToAll),
            "one_to_one" => Ok(Topology::OneToOne),
            other => Err(CircuitError::Configuration(format!(
                "topology {:?} is not supported",
                other
            ))),
        }
    }
}

/// An addressable sequence of units.
///
/// A `Single` population is addressed with its local indices, a `Concatenated`
/// one by position in the list of single-unit handles. Both resolve an index
/// through [`PopulationRef::element`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum PopulationRef {
    Single(Population),
    Concatenated(Vec<Population>),
}

impl PopulationRef {
    /// Returns the number of addressable units.
    pub fn len(&self) -> usize {
        match self {
            PopulationRef::Single(population) => population.size(),
            PopulationRef::Concatenated(populations) => populations.len(),
        }
    }

    /// Returns true if there is no addressable unit.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a handle to the unit at `index`.
    pub fn element(&self, engine: &mut dyn Engine, index: usize) -> Result<Population, CircuitError> {
        if index >= self.len() {
            return Err(CircuitError::OutOfBounds(format!(
                "unit {} of a population of size {}",
                index,
                self.len()
            )));
        }
        match self {
            PopulationRef::Single(population) if population.size() == 1 => Ok(*population),
            PopulationRef::Single(population) => engine.create_population_view(population, &[index]),
            PopulationRef::Concatenated(populations) => {
                let population = populations[index];
                if population.size() != 1 {
                    return Err(CircuitError::InvalidParameter(format!(
                        "element {} of a concatenated population holds {} units instead of one",
                        index,
                        population.size()
                    )));
                }
                Ok(population)
            }
        }
    }
}

impl From<Population> for PopulationRef {
    fn from(population: Population) -> Self {
        PopulationRef::Single(population)
    }
}

impl From<Vec<Population>> for PopulationRef {
    fn from(populations: Vec<Population>) -> Self {
        PopulationRef::Concatenated(populations)
    }
}

impl From<&[Population]> for PopulationRef {
    fn from(populations: &[Population]) -> Self {
        PopulationRef::Concatenated(populations.to_vec())
    }
}

impl From<Nested<Population>> for PopulationRef {
    fn from(nested: Nested<Population>) -> Self {
        match nested {
            Nested::Item(population) => PopulationRef::Single(population),
            list => PopulationRef::Concatenated(list.flatten()),
        }
    }
}

/// Which units (or which sub-circuits) a wiring call applies to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub enum IndexSet {
    /// The full range.
    #[default]
    All,
    /// An explicit subset, shared by every targeted sub-circuit.
    Shared(Vec<usize>),
    /// One subset per targeted sub-circuit.
    PerTarget(Vec<Vec<usize>>),
}

impl IndexSet {
    /// Returns true for a per-target index set.
    pub fn is_per_target(&self) -> bool {
        matches!(self, IndexSet::PerTarget(_))
    }

    /// The subset to hand to the sub-circuit at `position` among the targeted ones.
    ///
    /// Per-target sets yield their `position`-th entry, the others are returned unchanged.
    pub fn for_target(&self, position: usize) -> Result<IndexSet, CircuitError> {
        match self {
            IndexSet::PerTarget(subsets) => subsets
                .get(position)
                .map(|subset| IndexSet::Shared(subset.clone()))
                .ok_or_else(|| {
                    CircuitError::ArityMismatch(format!(
                        "no index subset for target {} among {}",
                        position,
                        subsets.len()
                    ))
                }),
            other => Ok(other.clone()),
        }
    }

    /// Checks that a per-target set provides exactly one subset per target.
    pub fn check_arity(&self, num_targets: usize) -> Result<(), CircuitError> {
        match self {
            IndexSet::PerTarget(subsets) if subsets.len() != num_targets => {
                Err(CircuitError::ArityMismatch(format!(
                    "{} index subsets provided for {} targets",
                    subsets.len(),
                    num_targets
                )))
            }
            _ => Ok(()),
        }
    }

    /// The subset to use on a single population, `None` meaning the full range.
    pub fn as_subset(&self) -> Result<Option<&[usize]>, CircuitError> {
        match self {
            IndexSet::All => Ok(None),
            IndexSet::Shared(subset) => Ok(Some(subset)),
            IndexSet::PerTarget(subsets) => Err(CircuitError::ArityMismatch(format!(
                "{} per-target index subsets provided for a single component",
                subsets.len()
            ))),
        }
    }
}

impl From<Vec<usize>> for IndexSet {
    fn from(subset: Vec<usize>) -> Self {
        IndexSet::Shared(subset)
    }
}

impl From<Vec<Vec<usize>>> for IndexSet {
    fn from(subsets: Vec<Vec<usize>>) -> Self {
        IndexSet::PerTarget(subsets)
    }
}

impl From<Option<Vec<usize>>> for IndexSet {
    fn from(subset: Option<Vec<usize>>) -> Self {
        subset.map_or(IndexSet::All, IndexSet::Shared)
    }
}

fn resolve_indexes(subset: Option<&[usize]>, len: usize, side: &str) -> Result<Vec<usize>, CircuitError> {
    match subset {
        None => Ok((0..len).collect()),
        Some(subset) => {
            let invalid: Vec<&usize> = subset.iter().filter(|&&index| index >= len).collect();
            if !invalid.is_empty() {
                return Err(CircuitError::OutOfBounds(format!(
                    "{} indexes [{}] exceed the population size {}",
                    side,
                    invalid.iter().join(", "),
                    len
                )));
            }
            Ok(subset.to_vec())
        }
    }
}

/// Create the connections between the selected units of two populations.
///
/// Missing subsets select the full range. Returns the number of connections
/// registered with the engine. All indexes and, for one-to-one wiring, the
/// subset lengths are checked before the first connection is created.
///
/// # Examples
///
/// ```
/// use rusty_blocks::connection::{Polarity, Synapse};
/// use rusty_blocks::engine::{Engine, NeuronModel};
/// use rusty_blocks::network::Network;
/// use rusty_blocks::topology::{create_connections, Topology};
///
/// let mut network = Network::new();
/// let model = NeuronModel::SpikeSourceArray { spike_times: vec![1.0] };
/// let source = network.create_population(3, &model).unwrap();
/// let target = network.create_population(4, &model).unwrap();
/// let synapse = Synapse::build(1.0, 1.0).unwrap();
///
/// let created = create_connections(
///     &mut network, &source.into(), &target.into(), &synapse,
///     Topology::AllToAll, Polarity::Excitatory, Some(&[0, 2]), None,
/// ).unwrap();
/// assert_eq!(created, 8);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn create_connections(
    engine: &mut dyn Engine,
    source: &PopulationRef,
    target: &PopulationRef,
    synapse: &Synapse,
    topology: Topology,
    polarity: Polarity,
    source_indexes: Option<&[usize]>,
    target_indexes: Option<&[usize]>,
) -> Result<usize, CircuitError> {
    let source_indexes = resolve_indexes(source_indexes, source.len(), "source")?;
    let target_indexes = resolve_indexes(target_indexes, target.len(), "target")?;

    if topology == Topology::OneToOne && source_indexes.len() != target_indexes.len() {
        return Err(CircuitError::ArityMismatch(format!(
            "one-to-one connections between {} source and {} target units",
            source_indexes.len(),
            target_indexes.len()
        )));
    }

    let sources = source_indexes
        .iter()
        .map(|&index| source.element(engine, index))
        .collect::<Result<Vec<Population>, CircuitError>>()?;
    let targets = target_indexes
        .iter()
        .map(|&index| target.element(engine, index))
        .collect::<Result<Vec<Population>, CircuitError>>()?;

    let pairs: Vec<(&Population, &Population)> = match topology {
        Topology::AllToAll => iproduct!(sources.iter(), targets.iter()).collect(),
        Topology::OneToOne => sources.iter().zip(targets.iter()).collect(),
    };

    for (src, tgt) in pairs.iter() {
        engine.create_connection(src, tgt, Connector::OneToOne, synapse, polarity)?;
    }

    log::trace!(
        "{} {} {} connections (weight {}, delay {})",
        pairs.len(),
        topology,
        polarity,
        synapse.weight(),
        synapse.delay()
    );
    Ok(pairs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NeuronModel;
    use crate::network::Network;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn setup(sizes: (usize, usize)) -> (Network, PopulationRef, PopulationRef, Synapse) {
        let mut network = Network::new();
        let model = NeuronModel::IfCurrExp(Default::default());
        let source = network.create_population(sizes.0, &model).unwrap();
        let target = network.create_population(sizes.1, &model).unwrap();
        (network, source.into(), target.into(), Synapse::build(1.0, 1.0).unwrap())
    }

    #[test]
    fn test_all_to_all_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (mut network, source, target, synapse) = setup((6, 5));
            let mut src: Vec<usize> = (0..6).collect();
            src.shuffle(&mut rng);
            src.truncate(rng.gen_range(0..=6));
            let mut tgt: Vec<usize> = (0..5).collect();
            tgt.shuffle(&mut rng);
            tgt.truncate(rng.gen_range(0..=5));

            let created = create_connections(
                &mut network,
                &source,
                &target,
                &synapse,
                Topology::AllToAll,
                Polarity::Excitatory,
                Some(&src),
                Some(&tgt),
            )
            .unwrap();
            assert_eq!(created, src.len() * tgt.len());
            assert_eq!(network.num_connections(), src.len() * tgt.len());
        }
    }

    #[test]
    fn test_full_range_by_default() {
        let (mut network, source, target, synapse) = setup((3, 4));
        let created = create_connections(
            &mut network,
            &source,
            &target,
            &synapse,
            Topology::AllToAll,
            Polarity::Inhibitory,
            None,
            None,
        )
        .unwrap();
        assert_eq!(created, 12);
        assert!(network
            .connections()
            .iter()
            .all(|c| c.polarity() == Polarity::Inhibitory));
    }

    #[test]
    fn test_one_to_one_pairs_in_subset_order() {
        let (mut network, source, target, synapse) = setup((4, 4));
        let created = create_connections(
            &mut network,
            &source,
            &target,
            &synapse,
            Topology::OneToOne,
            Polarity::Excitatory,
            Some(&[3, 0, 1]),
            Some(&[0, 2, 3]),
        )
        .unwrap();
        assert_eq!(created, 3);

        let (src, tgt) = match (&source, &target) {
            (PopulationRef::Single(s), PopulationRef::Single(t)) => (*s, *t),
            _ => unreachable!(),
        };
        let pairs: Vec<(usize, usize)> = network
            .connections()
            .iter()
            .map(|c| (c.source_id(), c.target_id()))
            .collect();
        let expected: Vec<(usize, usize)> = vec![(3, 0), (0, 2), (1, 3)]
            .into_iter()
            .map(|(i, j)| (network.neuron_ids(&src)[i], network.neuron_ids(&tgt)[j]))
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_one_to_one_arity_mismatch() {
        let (mut network, source, target, synapse) = setup((4, 4));
        let result = create_connections(
            &mut network,
            &source,
            &target,
            &synapse,
            Topology::OneToOne,
            Polarity::Excitatory,
            Some(&[0, 1, 2]),
            Some(&[0, 1]),
        );
        assert!(matches!(result, Err(CircuitError::ArityMismatch(_))));
        assert_eq!(network.num_connections(), 0);
        assert_eq!(network.num_projections(), 0);
    }

    #[test]
    fn test_out_of_bounds_creates_nothing() {
        let (mut network, source, target, synapse) = setup((2, 2));
        let result = create_connections(
            &mut network,
            &source,
            &target,
            &synapse,
            Topology::AllToAll,
            Polarity::Excitatory,
            Some(&[0, 5]),
            None,
        );
        assert!(matches!(result, Err(CircuitError::OutOfBounds(_))));
        assert_eq!(network.num_connections(), 0);
    }

    #[test]
    fn test_addressing_styles_are_equivalent() {
        let mut network = Network::new();
        let model = NeuronModel::IfCurrExp(Default::default());
        let synapse = Synapse::build(1.0, 1.0).unwrap();

        let block = network.create_population(3, &model).unwrap();
        let units: Vec<Population> = (0..3)
            .map(|_| network.create_population(1, &model).unwrap())
            .collect();
        let target = PopulationRef::from(network.create_population(1, &model).unwrap());

        let from_block = create_connections(
            &mut network,
            &block.into(),
            &target,
            &synapse,
            Topology::AllToAll,
            Polarity::Excitatory,
            Some(&[2, 0]),
            None,
        )
        .unwrap();
        let from_units = create_connections(
            &mut network,
            &units.clone().into(),
            &target,
            &synapse,
            Topology::AllToAll,
            Polarity::Excitatory,
            Some(&[2, 0]),
            None,
        )
        .unwrap();
        assert_eq!(from_block, from_units);

        let sources: Vec<usize> = network.connections().iter().map(|c| c.source_id()).collect();
        assert_eq!(
            sources,
            vec![
                network.neuron_ids(&block)[2],
                network.neuron_ids(&block)[0],
                network.neuron_ids(&units[2])[0],
                network.neuron_ids(&units[0])[0],
            ]
        );
    }

    #[test]
    fn test_concatenated_rejects_multi_unit_elements() {
        let mut network = Network::new();
        let model = NeuronModel::IfCurrExp(Default::default());
        let wide = network.create_population(2, &model).unwrap();
        let list = PopulationRef::from(vec![wide]);
        assert!(matches!(
            list.element(&mut network, 0),
            Err(CircuitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_index_set() {
        let shared = IndexSet::from(vec![1, 2]);
        assert_eq!(shared.for_target(5).unwrap(), shared);
        assert_eq!(shared.as_subset().unwrap(), Some(&[1, 2][..]));

        let per_target = IndexSet::from(vec![vec![0], vec![], vec![2, 3]]);
        assert!(per_target.is_per_target());
        assert_eq!(per_target.for_target(2).unwrap(), IndexSet::Shared(vec![2, 3]));
        assert_eq!(per_target.for_target(1).unwrap(), IndexSet::Shared(vec![]));
        assert!(per_target.check_arity(3).is_ok());
        assert!(matches!(per_target.check_arity(2), Err(CircuitError::ArityMismatch(_))));
        assert!(matches!(per_target.as_subset(), Err(CircuitError::ArityMismatch(_))));

        assert_eq!(IndexSet::from(None), IndexSet::All);
        assert_eq!(IndexSet::All.as_subset().unwrap(), None);
    }

    #[test]
    fn test_topology_from_str() {
        assert_eq!("one_to_one".parse::<Topology>(), Ok(Topology::OneToOne));
        assert_eq!("all_to_all".parse::<Topology>(), Ok(Topology::AllToAll));
        assert!(matches!(
            "fixed_probability".parse::<Topology>(),
            Err(CircuitError::Configuration(_))
        ));
    }
}
