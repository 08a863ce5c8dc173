//! Parameters shared by every block of a circuit build session.
//!
//! A [`CircuitParams`] bundles the global parameters (e.g. the minimum
//! inter-neuron delay), the neuron model parameters handed to the engine and
//! the default synapse used whenever a wiring call does not provide one.
//!
//! ```
//! use rusty_blocks::config::CircuitParams;
//!
//! let params = CircuitParams::from_json(r#"{"global": {"min_delay": 2.0}}"#).unwrap();
//! assert_eq!(params.global.min_delay, 2.0);
//! // The default synapse follows the minimum delay.
//! assert_eq!(params.synapse().unwrap().delay(), 2.0);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::connection::Synapse;
use crate::engine::NeuronModel;
use crate::error::CircuitError;

/// Parameters global to a circuit build session.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(default)]
pub struct GlobalParams {
    /// The minimum delay between two neurons, also the delay of the fixed internal synapses.
    pub min_delay: f64,
}

impl Default for GlobalParams {
    fn default() -> Self {
        GlobalParams { min_delay: 1.0 }
    }
}

/// Parameters of the current-based leaky integrate-and-fire neurons allocated by the blocks.
///
/// The defaults make a neuron fire exactly once per unit-weight input spike and
/// return to rest within one time step.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(default)]
pub struct NeuronParams {
    pub cm: f64,
    pub tau_m: f64,
    pub tau_refrac: f64,
    #[serde(alias = "tau_syn_E")]
    pub tau_syn_e: f64,
    #[serde(alias = "tau_syn_I")]
    pub tau_syn_i: f64,
    pub v_rest: f64,
    pub v_reset: f64,
    pub v_thresh: f64,
}

impl Default for NeuronParams {
    fn default() -> Self {
        NeuronParams {
            cm: 0.1,
            tau_m: 0.1,
            tau_refrac: 0.0,
            tau_syn_e: 0.1,
            tau_syn_i: 0.1,
            v_rest: -65.0,
            v_reset: -65.0,
            v_thresh: -64.91,
        }
    }
}

/// Weight and delay of the default synapse. A missing delay means `min_delay`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(default)]
pub struct SynapseParams {
    pub weight: f64,
    pub delay: Option<f64>,
}

impl Default for SynapseParams {
    fn default() -> Self {
        SynapseParams {
            weight: 1.0,
            delay: None,
        }
    }
}

/// Everything a block needs besides the engine to build itself.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Default)]
#[serde(default)]
pub struct CircuitParams {
    pub global: GlobalParams,
    pub neuron: NeuronParams,
    #[serde(rename = "std_conn")]
    pub default_synapse: SynapseParams,
}

impl CircuitParams {
    /// Create parameters whose default synapse has unit weight and the minimum delay.
    pub fn new(global: GlobalParams, neuron: NeuronParams) -> Result<Self, CircuitError> {
        let params = CircuitParams {
            global,
            neuron,
            default_synapse: SynapseParams::default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Replace the default synapse.
    pub fn with_synapse(mut self, synapse: &Synapse) -> Self {
        self.default_synapse = SynapseParams {
            weight: synapse.weight(),
            delay: Some(synapse.delay()),
        };
        self
    }

    /// The default synapse used when a wiring call does not provide one.
    pub fn synapse(&self) -> Result<Synapse, CircuitError> {
        let delay = self.default_synapse.delay.unwrap_or(self.global.min_delay);
        Synapse::build(self.default_synapse.weight, delay)
    }

    /// The model of the neurons allocated by the blocks.
    pub fn neuron_model(&self) -> NeuronModel {
        NeuronModel::IfCurrExp(self.neuron)
    }

    /// The synapse of fixed internal connections that must carry exactly `weight`.
    pub fn internal_synapse(&self, weight: f64) -> Result<Synapse, CircuitError> {
        Synapse::build(weight, self.global.min_delay)
    }

    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), CircuitError> {
        if !(self.global.min_delay.is_finite() && self.global.min_delay > 0.0) {
            return Err(CircuitError::Configuration(format!(
                "min_delay must be positive, got {}",
                self.global.min_delay
            )));
        }
        self.synapse()
            .map_err(|e| CircuitError::Configuration(format!("invalid default synapse: {}", e)))?;
        if self.neuron.v_thresh <= self.neuron.v_rest {
            return Err(CircuitError::Configuration(
                "v_thresh must lie above v_rest".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate parameters from a JSON string. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, CircuitError> {
        let params: CircuitParams = serde_json::from_str(json)
            .map_err(|e| CircuitError::Configuration(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate parameters from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, CircuitError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let params: CircuitParams = serde_json::from_reader(reader)
            .map_err(|e| CircuitError::Configuration(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Save the parameters to a JSON file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CircuitError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| CircuitError::IOError(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_synapse() {
        let params = CircuitParams::default();
        assert_eq!(params.synapse().unwrap(), Synapse::build(1.0, 1.0).unwrap());
        assert_eq!(params.internal_synapse(2.0).unwrap().weight(), 2.0);
    }

    #[test]
    fn test_with_synapse() {
        let params = CircuitParams::default().with_synapse(&Synapse::build(2.0, 3.0).unwrap());
        assert_eq!(params.synapse().unwrap().weight(), 2.0);
        assert_eq!(params.synapse().unwrap().delay(), 3.0);
    }

    #[test]
    fn test_from_json_partial() {
        let params = CircuitParams::from_json(
            r#"{"neuron": {"v_thresh": -64.5}, "std_conn": {"weight": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(params.neuron.v_thresh, -64.5);
        assert_eq!(params.neuron.v_rest, -65.0);
        assert_eq!(params.synapse().unwrap().weight(), 2.0);
        assert_eq!(params.synapse().unwrap().delay(), 1.0);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            CircuitParams::from_json(r#"{"global": {"min_delay": 0.0}}"#),
            Err(CircuitError::Configuration(_))
        ));
        assert!(matches!(
            CircuitParams::from_json(r#"{"std_conn": {"delay": -1.0}}"#),
            Err(CircuitError::Configuration(_))
        ));
        assert!(matches!(
            CircuitParams::from_json("not json"),
            Err(CircuitError::Configuration(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");

        let params = CircuitParams::new(GlobalParams { min_delay: 2.0 }, NeuronParams::default())
            .unwrap();
        params.save_to(&path).unwrap();

        let loaded = CircuitParams::load_from(&path).unwrap();
        assert_eq!(loaded, params);
        assert_eq!(loaded.synapse().unwrap().delay(), 2.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CircuitParams::load_from(dir.path().join("missing.json")),
            Err(CircuitError::IOError(_))
        ));
    }
}
