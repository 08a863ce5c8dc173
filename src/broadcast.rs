//! Broadcasting of one wiring call over an array of homogeneous components.

use crate::component::{Capability, Component, Wiring};
use crate::engine::Engine;
use crate::error::CircuitError;

/// Apply a capability to the components selected by `wiring.components` (all of them by default).
///
/// Per-target index sets are split so that the p-th targeted component gets
/// the p-th subset; shared ones reach every targeted component unchanged.
/// Positions and per-target arities are checked before the first call. A
/// failure on a later component leaves the earlier ones wired.
///
/// Returns the total number of connections created.
pub fn broadcast<T: Component>(
    engine: &mut dyn Engine,
    capability: Capability,
    components: &mut [T],
    wiring: &Wiring,
) -> Result<usize, CircuitError> {
    let positions: Vec<usize> = match &wiring.components {
        Some(positions) => positions.clone(),
        None => (0..components.len()).collect(),
    };

    if let Some(&position) = positions.iter().find(|&&position| position >= components.len()) {
        return Err(CircuitError::OutOfBounds(format!(
            "component {} of an array of {}",
            position,
            components.len()
        )));
    }
    wiring.source.check_arity(positions.len())?;
    wiring.target.check_arity(positions.len())?;

    let mut created = 0;
    for (rank, &position) in positions.iter().enumerate() {
        let resolved = wiring.for_target(rank)?;
        created += components[position].connect(engine, capability, &resolved)?;
    }

    log::debug!(
        "{} broadcast to {} components: {} connections",
        capability,
        positions.len(),
        created
    );
    Ok(created)
}
