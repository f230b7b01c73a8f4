//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation uses the classic
//! Schroeder reverb algorithm, one network per channel.
//!
//! # Schroeder Reverb Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n] + feedback * lowpass(y[n - delay])
//! ```
//!
//! The delay times are mutually prime so echoes do not pile up on the same
//! frequencies.
//!
//! ## Allpass Filters
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! # Parameters
//!
//! - **Room**: comb feedback, 0.7 to 0.98 (longer tail)
//! - **Damping**: high-frequency absorption inside the combs
//! - **Mix**: dry/wet balance
//!
//! Delay buffers are sized from the sample rate at construction and never
//! reallocated. Each allocated channel is offset by a few samples so a stereo
//! tail decorrelates.

use crate::dsp::{kernel::Kernel, numeric::clamp_finite};

/// Comb delay times in ms.
const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
/// Allpass delay times in ms.
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
/// Extra samples added per channel index to decorrelate channels.
const CHANNEL_SPREAD: usize = 23;

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// A simple comb filter for reverb.
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = clamp_finite(feedback, 0.0, 0.98, 0.5);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = clamp_finite(damp, 0.0, 1.0, 0.5);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass in the loop absorbs high frequencies.
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// An allpass filter for reverb diffusion.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = clamp_finite(feedback, 0.0, 0.9, 0.5);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.feedback * input + delayed;

        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// One mono Schroeder network: 4 parallel combs into 2 series allpasses.
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_spread(sample_rate, 0)
    }

    fn with_spread(sample_rate: f32, spread: usize) -> Self {
        let comb = |ms: f32| CombFilter::new(ms_to_samples(ms, sample_rate) + spread);
        let allpass = |ms: f32| AllpassFilter::new(ms_to_samples(ms, sample_rate) + spread);

        Self {
            combs: COMB_DELAYS_MS.map(comb),
            allpasses: ALLPASS_DELAYS_MS.map(allpass),
        }
    }

    /// Room size in [0, 1] scales comb feedback from 0.7 to 0.98.
    pub fn set_room_size(&mut self, size: f32) {
        let feedback = 0.7 + clamp_finite(size, 0.0, 1.0, 0.5) * 0.28;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    /// Process a single sample, returning the fully wet signal.
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

/// Per-call parameters for [`Reverb`].
#[derive(Debug, Clone, Copy)]
pub struct ReverbParams {
    pub room: f32,
    pub damping: f32,
    pub mix: f32,
}

/// Interleaved multi-channel reverb: one network per allocated channel.
pub struct Reverb {
    networks: Vec<SchroederReverb>,
}

impl Reverb {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let networks = (0..channels.max(1))
            .map(|channel| SchroederReverb::with_spread(sample_rate, channel * CHANNEL_SPREAD))
            .collect();
        Self { networks }
    }

    pub fn channels(&self) -> usize {
        self.networks.len()
    }
}

impl Kernel<ReverbParams> for Reverb {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: ReverbParams) {
        let channels = channels.max(1);
        let mix = clamp_finite(params.mix, 0.0, 1.0, 0.0);
        for network in &mut self.networks {
            network.set_room_size(params.room);
            network.set_damping(params.damping);
        }

        for chunk in buffer.chunks_mut(channels).take(frames) {
            // Channels without a network stay dry.
            for (sample, network) in chunk.iter_mut().zip(self.networks.iter_mut()) {
                let dry = *sample;
                let wet = network.process(dry);
                *sample = dry * (1.0 - mix) + wet * mix;
            }
        }
    }

    fn reset(&mut self) {
        for network in &mut self.networks {
            network.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        let out1 = comb.process(1.0);
        assert!(out1.abs() < 0.01);

        for _ in 0..9 {
            comb.process(0.0);
        }

        let echo = comb.process(0.0);
        assert!(echo.abs() > 0.4);
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut allpass = AllpassFilter::new(5);
        allpass.set_feedback(0.5);

        let mut energy_in = 0.0;
        let mut energy_out = 0.0;

        for i in 0..100 {
            let input = if i < 10 { 1.0 } else { 0.0 };
            let output = allpass.process(input);
            energy_in += input * input;
            energy_out += output * output;
        }

        assert!(energy_out > energy_in * 0.8);
    }

    #[test]
    fn test_schroeder_reverb_produces_tail() {
        let mut reverb = SchroederReverb::new(48000.0);
        reverb.set_room_size(0.5);
        reverb.set_damping(0.5);

        let _ = reverb.process(1.0);

        // Longest comb delay is ~43ms = ~2100 samples at 48kHz
        let has_tail = (0..5000).any(|_| reverb.process(0.0).abs() > 0.001);
        assert!(has_tail, "Reverb should produce a tail after impulse");
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = SchroederReverb::new(48000.0);
        reverb.set_room_size(1.0);

        for _ in 0..10000 {
            let out = reverb.process(0.1);
            assert!(out.is_finite(), "Reverb output should be finite");
            assert!(out.abs() < 10.0, "Reverb output unstable: {}", out);
        }
    }

    #[test]
    fn extra_channels_pass_dry() {
        let mut reverb = Reverb::new(48_000.0, 1);
        let mut buffer = vec![0.5; 8];
        let params = ReverbParams { room: 0.5, damping: 0.5, mix: 1.0 };
        reverb.process(&mut buffer, 4, 2, params);

        // Channel 1 has no network.
        assert!(buffer.iter().skip(1).step_by(2).all(|&s| s == 0.5));
        // Channel 0 is fully wet and the combs have not echoed yet.
        assert!(buffer.iter().step_by(2).all(|&s| s.abs() < 0.5));
    }

    #[test]
    fn zero_mix_is_dry() {
        let mut reverb = Reverb::new(48_000.0, 2);
        let mut buffer = vec![0.1, -0.2, 0.3, -0.4];
        let params = ReverbParams { room: 1.0, damping: 0.0, mix: 0.0 };
        reverb.process(&mut buffer, 2, 2, params);
        assert_eq!(buffer, vec![0.1, -0.2, 0.3, -0.4]);
    }
}
