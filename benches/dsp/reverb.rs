//! Benchmarks for the per-channel Schroeder reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    reverb::{Reverb, ReverbParams},
    Kernel,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size * CHANNELS)
            .map(|i| ((i / CHANNELS) as f32 * 0.05).sin())
            .collect();
        let mut buffer = input.clone();

        for (name, room) in [("small", 0.3), ("large", 0.9)] {
            let mut reverb = Reverb::new(SAMPLE_RATE, CHANNELS);
            let params = ReverbParams {
                room,
                damping: 0.5,
                mix: 0.4,
            };
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    reverb.process(black_box(&mut buffer), size, CHANNELS, black_box(params));
                })
            });
        }
    }

    group.finish();
}
