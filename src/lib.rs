//! A patchable, pull-based audio dataflow graph.
//!
//! Nodes are wired together at runtime through ports. Once per host audio
//! callback the [`engine::Evaluator`] pulls every registered sink, each sink
//! pulls its inputs, and so on down to the sources. Every node renders at most
//! once per callback no matter how many consumers it has, and a feedback patch
//! reads as silence instead of recursing forever.

pub mod config;
pub mod dsp; // Stateful DSP kernels with no graph awareness
pub mod engine; // Host callback, buffer pool, taps
pub mod error;
pub mod graph; // Nodes, ports and the render contract
pub mod io; // cpal streams and analysis consumers

pub use config::EngineConfig;
pub use error::{Error, Result};

/// Largest block rendered in a single pass, in frames.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Largest interleaved channel count the engine accepts.
pub const MAX_CHANNELS: usize = 8;
/// Default limit on how many ports one node may feed.
pub const DEFAULT_MAX_FAN_OUT: usize = 64;
