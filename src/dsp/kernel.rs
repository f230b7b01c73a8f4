//! The contract between graph nodes and the DSP algorithms they drive.

/*
Native Processing Kernels
=========================

A kernel is a stateful DSP algorithm with no idea that a graph exists. It
knows how to turn a buffer into another buffer, nothing more.

Lifecycle
---------

    create   Kernel::new(sample_rate, ...)      once, on the control path
    drive    kernel.process(buffer, frames,     once per callback, audio path
                            channels, params)
    free     drop(kernel)                       once, when the node goes away

Parameters travel BY VALUE on every call. The kernel never stores a knob
value it was handed; it only keeps the state its algorithm needs (phase,
filter integrators, delay contents). This keeps the owning node the single
source of truth for parameter state, and it means swapping one kernel for
another never loses a setting.

Buffer layout
-------------

Buffers are interleaved: frame 0 channel 0, frame 0 channel 1, ... The
`frames` and `channels` arguments always satisfy

    buffer.len() == frames * channels

Allocation
----------

`process` must not allocate, lock or block. Anything a kernel needs is sized
in its constructor.
*/

/// A native processing kernel driven with parameters of type `P`.
///
/// `P` is usually a small `Copy` struct, or a struct borrowing audio-rate
/// modulation slices for the duration of one call.
pub trait Kernel<P>: Send {
    /// Process `frames * channels` interleaved samples in place.
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: P);

    /// Return to the freshly-constructed state without reallocating.
    fn reset(&mut self) {}
}
