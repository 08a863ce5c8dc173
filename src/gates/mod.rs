//! Logic gates: NOT, OR, AND and XOR, with their arrays.
mod and;
mod not;
mod or;
mod xor;

pub use and::{And, AndType, MultipleAnd};
pub use not::{MultipleNot, Not};
pub use or::{MultipleOr, Or};
pub use xor::{MultipleXor, Xor};

use crate::config::CircuitParams;
use crate::engine::{Engine, Population};
use crate::error::CircuitError;

/// Allocate `size` neurons with the model of the session.
pub(crate) fn create_neurons(
    engine: &mut dyn Engine,
    params: &CircuitParams,
    size: usize,
) -> Result<Population, CircuitError> {
    engine.create_population(size, &params.neuron_model())
}
