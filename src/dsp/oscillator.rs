use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    kernel::Kernel,
    modulate::Modulation,
    numeric::clamp_finite,
    trigger::{Edge, EdgeDetector},
};

/*
Phase-Accumulator Oscillator
============================

    phase      position inside one cycle, in [0, 1)
    increment  frequency / sample_rate, added every sample

    sine       sin(2π · phase)
    saw        2 · phase − 1
    square     +1 for the first half of the cycle, −1 for the second
    triangle   1 − 4 · |phase − 0.5|
    noise      uniform random in [−1, 1], phase unused

Frequency modulation is exponential (volts-per-octave style): an FM input
of +1 at depth 1 doubles the frequency, −1 halves it.

    f = frequency · 2 ^ (fm · fm_depth)

The result is clamped to [0, Nyquist]. Amplitude modulation multiplies.
A rising edge on the sync input snaps the phase back to 0 on that frame.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

/// Per-call parameters for [`Oscillator`].
#[derive(Debug, Clone, Copy)]
pub struct OscParams<'a> {
    pub waveform: Waveform,
    /// Base frequency in Hz.
    pub frequency: f32,
    /// Exponential frequency modulation, in units of `fm_depth` octaves.
    pub fm: Modulation<'a>,
    pub fm_depth: f32,
    pub amplitude: f32,
    /// Multiplies `amplitude` when present.
    pub am: Option<Modulation<'a>>,
    /// Phase reset signal, read at audio rate.
    pub sync: Option<&'a [f32]>,
}

pub struct Oscillator {
    sample_rate: f32,
    phase: f32,
    rng: fastrand::Rng,
    sync_edge: EdgeDetector,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, 0x5eed)
    }

    /// Seed the noise source explicitly, e.g. for reproducible tests.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            rng: fastrand::Rng::with_seed(seed),
            sync_edge: EdgeDetector::new(),
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    fn shape(&mut self, waveform: Waveform) -> f32 {
        let phase = self.phase;
        match waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Noise => self.rng.f32() * 2.0 - 1.0,
        }
    }

    #[inline]
    fn advance(&mut self, frequency: f32) {
        self.phase += frequency / self.sample_rate;
        self.phase -= self.phase.floor();
    }
}

impl<'a> Kernel<OscParams<'a>> for Oscillator {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: OscParams<'a>) {
        let channels = channels.max(1);
        let nyquist = self.sample_rate * 0.5;

        for (frame, chunk) in buffer.chunks_mut(channels).take(frames).enumerate() {
            if let Some(sync) = params.sync {
                let sample = sync.get(frame * channels).copied().unwrap_or(0.0);
                if self.sync_edge.step(sample) == Some(Edge::Rising) {
                    self.phase = 0.0;
                }
            }

            let octaves = params.fm.at(frame) * params.fm_depth;
            let frequency = params.frequency * 2.0_f32.powf(octaves);
            let frequency = clamp_finite(frequency, 0.0, nyquist, 0.0);

            let mut amplitude = params.amplitude;
            if let Some(am) = params.am {
                amplitude *= am.at(frame);
            }

            let value = self.shape(params.waveform) * amplitude;
            chunk.fill(value);
            self.advance(frequency);
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.sync_edge.reset();
    }
}
