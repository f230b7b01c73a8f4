//! Patchable audio nodes and the render contract that ties them together.
//!
//! A node is a [`Processor`] wrapped in a [`Node`]: the wrapper owns the
//! input ports, knob parameters, recursion guard and per-callback cache, so
//! processors only describe their DSP. Modulation inputs add to the matching
//! knob unless a node documents otherwise.

/// Voltage-controlled amplifier (`in × cv × gain`).
pub mod amplifier;
/// Growable zeroed scratch buffers.
pub mod buffer;
/// Per-timestamp render memoization.
pub mod cache;
/// Constant-value dial.
pub mod control;
/// Block-rate crossfade between two inputs.
pub mod crossfader;
/// Feedback delay with audio-rate time modulation.
pub mod delay;
/// AD and ADSR envelope generators.
pub mod envelope;
/// Host-captured input (microphone) fed through a ring buffer.
pub mod external;
/// State-variable filter node.
pub mod filter;
/// Four-input summing mixer.
pub mod mixer;
/// Signal splitter.
pub mod multiple;
/// Node wrapper, render context and the processor trait.
pub mod node;
/// Audio-band oscillators and noise.
pub mod oscillator;
/// Knob parameters.
pub mod param;
/// Input ports and the connect/disconnect interface.
pub mod port;
/// Gate-to-impulse converter and free-running clock.
pub mod pulse;
/// Schroeder reverb node.
pub mod reverb;
/// Sample playback with a control-path transport.
pub mod sampler;
/// Output endpoint.
pub mod speaker;

pub use amplifier::AmplifierNode;
pub use control::ControlNode;
pub use crossfader::CrossfaderNode;
pub use delay::DelayNode;
pub use envelope::{AdEnvelopeNode, AdsrEnvelopeNode};
pub use external::ExternalInputNode;
pub use filter::FilterNode;
pub use mixer::MixerNode;
pub use multiple::MultipleNode;
pub use node::{AudioContext, Node, NodeIo, NodeKind, NodeRef, Processor};
pub use oscillator::OscillatorNode;
pub use param::{Param, ParamSpec};
pub use port::{connect, connect_with_limit, disconnect, ControlRate, Port, PortSpec};
pub use pulse::PulseNode;
pub use reverb::ReverbNode;
pub use sampler::{SamplerHandle, SamplerNode};
pub use speaker::SpeakerNode;
