//! This crate provides digital-logic building blocks made of spiking neurons.
//!
//! Every block (NOT, OR, AND and XOR gates, SR and D latches, oscillators,
//! flank detectors, decoders, encoders, multiplexers and memories) allocates
//! its neurons and wires its fixed internals against an [`engine::Engine`]
//! when built, and is then extended by wiring calls reporting the number of
//! connections they created.
//!
//! # Building Circuits
//!
//! ```rust
//! use rusty_blocks::circuits::ConstantSource;
//! use rusty_blocks::component::{Component, Wiring};
//! use rusty_blocks::config::CircuitParams;
//! use rusty_blocks::gates::Not;
//! use rusty_blocks::network::Network;
//! use rusty_blocks::topology::PopulationRef;
//!
//! let mut network = Network::new();
//! let params = CircuitParams::default();
//!
//! // A NOT gate needs a constant bias to fire.
//! let mut bias = ConstantSource::new(&mut network, &params).unwrap();
//! let mut gate = Not::new(&mut network, &params).unwrap();
//! let gate_ref = PopulationRef::from(gate.output_neuron());
//! bias.connect_outputs(&mut network, &Wiring::new(&gate_ref)).unwrap();
//!
//! let input = PopulationRef::from(network.create_spike_sources(&[vec![5.0]]).unwrap());
//! assert_eq!(gate.connect_inputs(&mut network, &Wiring::new(&input)).unwrap(), 1);
//!
//! assert_eq!(network.num_neurons(), 4);
//! assert_eq!(bias.total_output_connections() + gate.total_input_connections(), 3);
//! ```
//!
//! # Simulating Circuits
//!
//! The reference engine [`network::Network`] runs an idealized simulation in
//! which a neuron fires whenever the weights reaching it at a step sum up to
//! [`FIRING_THRESHOLD`].
//!
//! ```rust
//! use rusty_blocks::component::{Component, Wiring};
//! use rusty_blocks::config::CircuitParams;
//! use rusty_blocks::gates::{And, AndType};
//! use rusty_blocks::network::Network;
//! use rusty_blocks::topology::PopulationRef;
//!
//! let mut network = Network::new();
//! let mut gate = And::new(&mut network, &CircuitParams::default(), 2, AndType::Classic).unwrap();
//! let inputs = network.create_spike_sources(&[vec![2.0, 8.0], vec![8.0]]).unwrap();
//! gate.connect_inputs(&mut network, &Wiring::new(&PopulationRef::from(inputs))).unwrap();
//!
//! let record = network.simulate(15.0).unwrap();
//! assert_eq!(record.firing_times(&gate.output_neuron())[0], vec![8.0 + 1.0 + gate.delay()]);
//! ```

pub mod broadcast;
pub mod circuits;
pub mod component;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod gates;
pub mod multiple;
pub mod network;
pub mod topology;

/// The tolerance for a summed input to be considered reaching the threshold.
pub const POTENTIAL_TOLERANCE: f64 = 1e-9;
/// The nominal threshold for a neuron to fire.
pub const FIRING_THRESHOLD: f64 = 1.0;
