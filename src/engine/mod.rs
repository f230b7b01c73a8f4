//! The audio-thread side: host callback, buffer pool and observation taps.

/// Host callback and control handle.
pub mod evaluator;
/// Size-class pool of zeroed buffers.
pub mod pool;
/// Read-only observation of node output.
pub mod tap;

pub use evaluator::{EngineHandle, Evaluator};
pub use pool::BufferPool;
pub use tap::TapReader;
