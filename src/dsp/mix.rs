//! Signal mixing, crossfading and gain primitives.

use crate::dsp::modulate::{Modulation, Ramp};

/*
Signal Mixing
=============

Mixing ADDS signals; amplifying MULTIPLIES them. Everything a mixer, a
crossfader or an amplifier does reduces to one of the helpers below, run on
interleaved buffers with one gain value per frame.

Linear Crossfade
----------------

    output = A × (1 − position) + B × position

    position = 0.0  →  all A
    position = 0.5  →  half of each
    position = 1.0  →  all B

The weights sum to 1.0, so two full-scale signals never exceed full scale.
Perceived loudness dips slightly at the centre; that is the accepted cost
of the linear law.

Ramped Gains
------------

Gains set from a control (a fader, a knob) change between callbacks. Each
helper takes a `Ramp` and walks it one step per frame so a change lands on
the last frame without a step discontinuity. A constant ramp is a plain
gain.

Clipping
--------

Summing is unbounded: four inputs at full scale sum to 4.0. The host output
stage clips, the mixer does not.
*/

/// Crossfade `b` into `a` in place, `position` ramped per frame.
#[inline]
pub fn crossfade_in_place(a: &mut [f32], b: &[f32], channels: usize, position: Ramp) {
    let channels = channels.max(1);
    let frames = a.len() / channels;

    for (frame, (chunk_a, chunk_b)) in a.chunks_mut(channels).zip(b.chunks(channels)).enumerate() {
        let balance = position.at(frame, frames).clamp(0.0, 1.0);
        for (sa, &sb) in chunk_a.iter_mut().zip(chunk_b) {
            *sa = blend_dry_wet(*sa, sb, balance);
        }
    }
}

/// Accumulate `src × gain` into `dst`, `gain` ramped per frame.
#[inline]
pub fn sum_scaled_into(dst: &mut [f32], src: &[f32], channels: usize, gain: Ramp) {
    let channels = channels.max(1);
    let frames = dst.len() / channels;

    if gain.from == gain.to {
        let g = gain.to;
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s * g;
        }
        return;
    }

    for (frame, (chunk_d, chunk_s)) in dst.chunks_mut(channels).zip(src.chunks(channels)).enumerate() {
        let g = gain.at(frame, frames);
        for (d, &s) in chunk_d.iter_mut().zip(chunk_s) {
            *d += s * g;
        }
    }
}

/// Add `src` into `dst` without weighting.
#[inline]
pub fn sum_in_place(dst: &mut [f32], src: &[f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}

/// Scale `buffer` in place by a ramped gain.
#[inline]
pub fn scale_in_place(buffer: &mut [f32], channels: usize, gain: Ramp) {
    let channels = channels.max(1);
    let frames = buffer.len() / channels;

    for (frame, chunk) in buffer.chunks_mut(channels).enumerate() {
        let g = gain.at(frame, frames);
        for sample in chunk {
            *sample *= g;
        }
    }
}

/// Multiply `buffer` by a modulation signal (channel 0 of each frame).
#[inline]
pub fn multiply_in_place(buffer: &mut [f32], channels: usize, modulation: Modulation<'_>) {
    let channels = channels.max(1);
    for (frame, chunk) in buffer.chunks_mut(channels).enumerate() {
        let m = modulation.at(frame);
        for sample in chunk {
            *sample *= m;
        }
    }
}

/// output = dry × (1 − mix) + wet × mix
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossfade_endpoints() {
        let mut a = [1.0, 0.5, -0.5, -1.0];
        crossfade_in_place(&mut a, &[0.0; 4], 1, Ramp::constant(0.0));
        assert_eq!(a, [1.0, 0.5, -0.5, -1.0]);

        let mut a = [0.0; 4];
        crossfade_in_place(&mut a, &[1.0, 0.5, -0.5, -1.0], 1, Ramp::constant(1.0));
        assert_eq!(a, [1.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let mut a = [1.0, 1.0];
        crossfade_in_place(&mut a, &[1.0, 1.0], 2, Ramp::constant(0.5));
        assert_eq!(a, [1.0, 1.0]);
    }

    #[test]
    fn test_crossfade_ramp_applies_per_frame() {
        // Stereo, 4 frames, ramp 0 -> 1: frame weights 0.25, 0.5, 0.75, 1.0.
        let mut a = [0.0; 8];
        let b = [1.0; 8];
        crossfade_in_place(&mut a, &b, 2, Ramp::new(0.0, 1.0));
        assert_eq!(a, [0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0]);
    }

    #[test]
    fn test_position_clamped() {
        let mut a = [1.0];
        crossfade_in_place(&mut a, &[0.0], 1, Ramp::constant(2.0));
        assert_eq!(a[0], 0.0);

        let mut a = [1.0];
        crossfade_in_place(&mut a, &[0.0], 1, Ramp::constant(-1.0));
        assert_eq!(a[0], 1.0);
    }

    #[test]
    fn test_sum_can_exceed_one() {
        let mut dst = [1.0, 0.5];
        sum_in_place(&mut dst, &[1.0, 0.8]);
        assert_eq!(dst, [2.0, 1.3]);
    }

    #[test]
    fn test_sum_scaled_into() {
        let mut dst = [1.0; 4];
        sum_scaled_into(&mut dst, &[1.0; 4], 1, Ramp::constant(0.5));
        assert_eq!(dst, [1.5; 4]);

        let mut dst = [0.0; 4];
        sum_scaled_into(&mut dst, &[1.0; 4], 1, Ramp::new(0.0, 1.0));
        assert_eq!(dst, [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_scale_and_multiply() {
        let mut buffer = [1.0; 4];
        scale_in_place(&mut buffer, 2, Ramp::new(1.0, 0.0));
        assert_eq!(buffer, [0.5, 0.5, 0.0, 0.0]);

        let cv = [0.5, 9.0, 2.0, 9.0];
        let mut buffer = [1.0; 4];
        multiply_in_place(&mut buffer, 2, Modulation::Audio { samples: &cv, channels: 2 });
        assert_eq!(buffer, [0.5, 0.5, 2.0, 2.0]);
    }

    #[test]
    fn test_blend_dry_wet() {
        assert_eq!(blend_dry_wet(1.0, 0.5, 0.0), 1.0);
        assert_eq!(blend_dry_wet(1.0, 0.5, 1.0), 0.5);
        assert_eq!(blend_dry_wet(1.0, 0.0, 0.5), 0.5);
    }
}
