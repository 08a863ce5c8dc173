//! Circuits built from gates: latches, oscillators, edge detectors, decoders,
//! encoders, multiplexers and memories.
mod constant_source;
mod decoder;
mod encoder;
mod flank_detector;
mod latch_d;
mod latch_sr;
mod memory;
mod muxdemux;
mod oscillator;

pub use constant_source::ConstantSource;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use flank_detector::FlankDetector;
pub use latch_d::{LatchD, MultipleLatchD};
pub use latch_sr::{LatchSr, MultipleLatchSr};
pub use memory::Memory;
pub use muxdemux::{MuxDemux, MuxKind};
pub use oscillator::{AsyncOscillator, MultipleAsyncOscillator, SyncOscillator};
