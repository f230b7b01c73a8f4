use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{kernel::Kernel, numeric::clamp_finite},
    MAX_CHANNELS,
};

/*
State-Variable Filter (TPT)
===========================

Two trapezoidal integrators in a loop. One pass produces all four responses
at once, so switching mode is free:

| mode     | output                  | passes          | rejects      |
| -------- | ----------------------- | --------------- | ------------ |
| low-pass | v2                      | below cutoff    | above cutoff |
| high-pass| x − k·v1 − v2           | above cutoff    | below cutoff |
| band-pass| v1                      | around cutoff   | elsewhere    |
| notch    | x − k·v1                | elsewhere       | at cutoff    |

    g = tan(π · cutoff / sample_rate)      prewarped integrator gain
    k = 2 − 2 · resonance                  damping; 0 would self-oscillate

Coefficients are recomputed once per call (block rate). Each channel of an
interleaved buffer keeps its own integrator memory; the coefficients are
shared.
*/

/// Upper bound on resonance; keeps damping positive.
pub const MAX_RESONANCE: f32 = 0.98;
/// Lowest accepted cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 10.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterMode {
    /// Map a control value (0, 1, 2, 3) onto a mode.
    pub fn from_index(index: f32) -> Self {
        match index.round() as i32 {
            1 => FilterMode::HighPass,
            2 => FilterMode::BandPass,
            3 => FilterMode::Notch,
            _ => FilterMode::LowPass,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

/// Per-call parameters for [`SVFilter`].
#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    pub mode: FilterMode,
    pub cutoff_hz: f32,
    /// 0 is flat, approaching 1 rings at the cutoff.
    pub resonance: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Integrators {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl Integrators {
    #[inline]
    fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }
}

pub struct SVFilter {
    sample_rate: f32,
    states: [Integrators; MAX_CHANNELS],
}

impl SVFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            states: [Integrators::default(); MAX_CHANNELS],
        }
    }

    #[inline]
    fn compute_g(&self, cutoff_hz: f32) -> f32 {
        let nyquist_guard = self.sample_rate * 0.49;
        let cutoff = clamp_finite(cutoff_hz, MIN_CUTOFF_HZ, nyquist_guard.max(MIN_CUTOFF_HZ), 1_000.0);
        (TAU * cutoff / (2.0 * self.sample_rate)).tan()
    }
}

impl Kernel<FilterParams> for SVFilter {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: FilterParams) {
        let channels = channels.max(1);
        let g = self.compute_g(params.cutoff_hz);
        let k = 2.0 - 2.0 * clamp_finite(params.resonance, 0.0, MAX_RESONANCE, 0.0);

        for chunk in buffer.chunks_mut(channels).take(frames) {
            // Channels past MAX_CHANNELS have no state and pass through.
            for (sample, state) in chunk.iter_mut().zip(self.states.iter_mut()) {
                let outputs = state.next_sample(*sample, k, g);
                *sample = match params.mode {
                    FilterMode::LowPass => outputs.lowpass,
                    FilterMode::HighPass => outputs.highpass,
                    FilterMode::BandPass => outputs.bandpass,
                    FilterMode::Notch => outputs.notch,
                };
            }
        }
    }

    fn reset(&mut self) {
        self.states = [Integrators::default(); MAX_CHANNELS];
    }
}
