//! Parameter modulation primitives.

/*
Parameter Modulation
====================

A modulation input is an ordinary patch cable carrying an ordinary signal.
What differs between inputs is how OFTEN the receiving node looks at it.

Vocabulary
----------

  base value    The knob setting. Used as-is when nothing is patched in.

  depth         How far the modulator moves the parameter:
                  final_value = base_value + (modulator × depth)

  block-rate    Read one value per buffer (frame 0) and hold it for the whole
                buffer. Cheap; right for parameters that are expensive to
                recompute (filter coefficients) or that the user moves by hand
                (a fader).

  audio-rate    Read every frame. Required when the modulator is itself an
                audio signal (FM, delay-time wobble) or carries triggers.


Block-Rate Without Zipper Noise
-------------------------------

Jumping a gain from 0.2 to 0.8 between two buffers produces an audible step.
`Ramp` interpolates linearly from the previous buffer's value to this
buffer's value, one step per frame:

    previous = 0.2, current = 0.8, frames = 4

    frame:   0     1     2     3
    value: 0.35  0.50  0.65  0.80

The last frame lands exactly on the new value, so the next buffer starts
from where this one ended.


Choosing a Rate
---------------

The choice belongs to the parameter's musical role, not to the patch:

    oscillator frequency   audio-rate   (FM must be per sample)
    delay time             audio-rate   (handed whole to the kernel)
    envelope trigger       audio-rate   (pulses can land on any frame)
    filter cutoff          block-rate   (coefficient math per buffer)
    fader position         block-rate   (hand-moved, ramped)
    delay feedback / mix   block-rate
*/

/// The block-rate control value: channel 0 of frame 0.
#[inline]
pub fn first_frame(samples: &[f32]) -> f32 {
    samples.first().copied().unwrap_or(0.0)
}

/// A parameter as a kernel sees it for one call.
#[derive(Debug, Clone, Copy)]
pub enum Modulation<'a> {
    /// One value held for the whole buffer.
    Block(f32),
    /// One value per frame, read from channel 0 of an interleaved buffer.
    Audio { samples: &'a [f32], channels: usize },
}

impl<'a> Modulation<'a> {
    /// Value for `frame`, falling back to the last available frame.
    #[inline]
    pub fn at(&self, frame: usize) -> f32 {
        match *self {
            Modulation::Block(value) => value,
            Modulation::Audio { samples, channels } => {
                let channels = channels.max(1);
                let index = frame * channels;
                if index < samples.len() {
                    samples[index]
                } else if samples.len() >= channels {
                    samples[samples.len() - channels]
                } else {
                    0.0
                }
            }
        }
    }
}

/// Linear interpolation of a parameter across one buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: f32,
    pub to: f32,
}

impl Ramp {
    pub fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// A ramp that holds one value.
    pub fn constant(value: f32) -> Self {
        Self { from: value, to: value }
    }

    /// Value for `frame` of `frames`; the last frame returns `to` exactly.
    #[inline]
    pub fn at(&self, frame: usize, frames: usize) -> f32 {
        if frames == 0 || self.from == self.to {
            return self.to;
        }
        let t = (frame + 1) as f32 / frames as f32;
        self.from + (self.to - self.from) * t
    }
}

/// Remembers the previous block's value so the next block can ramp from it.
#[derive(Debug, Clone, Copy)]
pub struct Smoothed {
    previous: Option<f32>,
}

impl Default for Smoothed {
    fn default() -> Self {
        Self::new()
    }
}

impl Smoothed {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Ramp from the last value to `target`. The first call does not ramp.
    pub fn ramp_to(&mut self, target: f32) -> Ramp {
        let from = self.previous.unwrap_or(target);
        self.previous = Some(target);
        Ramp::new(from, target)
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
