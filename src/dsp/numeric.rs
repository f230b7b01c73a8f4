//! Numeric hygiene for the render path.
//!
//! Every node output is scrubbed before it leaves the node, so a degenerate
//! parameter combination costs at most a silent sample, never a NaN that
//! poisons every filter and delay line downstream.

/// Replace every non-finite sample with silence.
#[inline]
pub fn sanitize(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        if !sample.is_finite() {
            *sample = 0.0;
        }
    }
}

/// Clamp `value` into `[min, max]`, substituting `fallback` for NaN.
///
/// `f32::clamp` passes NaN straight through, which is exactly the value we
/// need to keep out of exponent and length computations.
#[inline]
pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// `base^exponent` restricted to the domain the envelopes use.
///
/// The base is clamped to `[0, 1]` so fractional exponents never see a
/// negative base, and a non-finite result (e.g. `0^negative`) collapses to 0.
#[inline]
pub fn safe_pow(base: f32, exponent: f32) -> f32 {
    let base = clamp_finite(base, 0.0, 1.0, 0.0);
    let value = base.powf(exponent);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Hard clip to the legal output range. Only the endpoint applies this.
#[inline]
pub fn hard_clip(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = clamp_finite(*sample, -1.0, 1.0, 0.0);
    }
}
