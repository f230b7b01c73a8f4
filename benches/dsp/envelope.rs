//! Benchmarks for the AD and ADSR envelope generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    envelope::{AdEnvelope, AdParams, AdsrEnvelope, AdsrParams},
    modulate::Ramp,
    Kernel,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size * CHANNELS];
        let mut trigger = vec![0.0f32; size];
        trigger[0] = 1.0;

        // Retriggered every block, curved stages
        let mut env = AdEnvelope::new();
        group.bench_with_input(BenchmarkId::new("ad", size), &size, |b, _| {
            b.iter(|| {
                let params = AdParams {
                    trigger: Some(&trigger),
                    attack: Ramp::constant(0.01 * SAMPLE_RATE),
                    decay: Ramp::constant(0.2 * SAMPLE_RATE),
                    attack_curve: Ramp::constant(2.0),
                    decay_curve: Ramp::constant(3.0),
                };
                env.process(black_box(&mut buffer), size, 1, black_box(params));
            })
        });

        // Knobs moving every block, so every sample interpolates
        let mut env = AdEnvelope::new();
        group.bench_with_input(BenchmarkId::new("ad_ramped", size), &size, |b, _| {
            b.iter(|| {
                let params = AdParams {
                    trigger: Some(&trigger),
                    attack: Ramp::new(480.0, 960.0),
                    decay: Ramp::new(9_600.0, 4_800.0),
                    attack_curve: Ramp::new(1.0, 4.0),
                    decay_curve: Ramp::new(0.5, 2.0),
                };
                env.process(black_box(&mut buffer), size, 1, black_box(params));
            })
        });

        // Gate held high: attack, decay, then sustain
        let gate = vec![1.0f32; size];
        let mut env = AdsrEnvelope::new();
        group.bench_with_input(BenchmarkId::new("adsr_held", size), &size, |b, _| {
            b.iter(|| {
                let params = AdsrParams {
                    gate: Some(&gate),
                    attack: Ramp::constant(0.005 * SAMPLE_RATE),
                    decay: Ramp::constant(0.1 * SAMPLE_RATE),
                    sustain: Ramp::constant(0.7),
                    release: Ramp::constant(0.3 * SAMPLE_RATE),
                    curve: Ramp::constant(1.0),
                };
                env.process(black_box(&mut buffer), size, CHANNELS, black_box(params));
            })
        });
    }

    group.finish();
}
