//! Benchmarks for buffer mixing utilities.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    mix::{crossfade_in_place, multiply_in_place, sum_in_place, sum_scaled_into},
    modulate::{Modulation, Ramp},
};

use crate::{BLOCK_SIZES, CHANNELS};

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let len = size * CHANNELS;
        let a: Vec<f32> = (0..len).map(|i| (i as f32 * 0.01).sin()).collect();
        let b_signal: Vec<f32> = (0..len).map(|i| (i as f32 * 0.02).cos()).collect();
        let cv: Vec<f32> = (0..size).map(|i| i as f32 / size as f32).collect();
        let mut buffer = vec![0.0f32; len];

        group.bench_with_input(BenchmarkId::new("sum", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&a);
                sum_in_place(black_box(&mut buffer), black_box(&b_signal));
            })
        });

        group.bench_with_input(BenchmarkId::new("sum_ramped", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&a);
                sum_scaled_into(
                    black_box(&mut buffer),
                    black_box(&b_signal),
                    CHANNELS,
                    Ramp::new(0.2, 0.8),
                );
            })
        });

        group.bench_with_input(BenchmarkId::new("crossfade", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&a);
                crossfade_in_place(
                    black_box(&mut buffer),
                    black_box(&b_signal),
                    CHANNELS,
                    Ramp::new(0.0, 1.0),
                );
            })
        });

        group.bench_with_input(BenchmarkId::new("vca", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&a);
                let modulation = Modulation::Audio {
                    samples: &cv,
                    channels: 1,
                };
                multiply_in_place(black_box(&mut buffer), CHANNELS, modulation);
            })
        });
    }

    group.finish();
}
