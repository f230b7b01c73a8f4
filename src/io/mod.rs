//! Host audio I/O and analysis consumers.
//!
//! Everything here runs outside the graph: [`OutputStream`] owns the device
//! callback that drives the evaluator, [`InputCapture`] feeds a microphone
//! into an [`ExternalInputNode`](crate::graph::ExternalInputNode), and
//! [`SpectrumAnalyzer`] turns tap samples into a magnitude spectrum on the
//! UI side.

pub mod input;
pub mod output;
pub mod spectrum;

pub use input::InputCapture;
pub use output::OutputStream;
pub use spectrum::SpectrumAnalyzer;
