//! Low-level DSP kernels used by the graph nodes.
//!
//! Kernels know nothing about ports, caches or timestamps. Each one is created
//! once with its sample rate, driven with `process(buffer, frames, channels,
//! params)` where the parameters arrive by value on every call, and freed on
//! drop. They do not allocate while processing.

/// Interleaved multi-channel delay line with fractional reads.
pub mod delay;
/// AD and ADSR envelope state machines.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// The shared kernel trait.
pub mod kernel;
/// Crossfade, sum and gain helpers.
pub mod mix;
/// Block/audio-rate modulation values and parameter ramps.
pub mod modulate;
/// Non-finite scrubbing and clamping.
pub mod numeric;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Schroeder reverb.
pub mod reverb;
/// Gate edge detection.
pub mod trigger;

pub use kernel::Kernel;
