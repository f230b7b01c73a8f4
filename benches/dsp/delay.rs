//! Benchmarks for the interleaved delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    delay::{DelayLine, DelayParams},
    modulate::Modulation,
    Kernel,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size * CHANNELS)
            .map(|i| if i % 64 == 0 { 1.0 } else { 0.0 })
            .collect();
        let mut buffer = input.clone();

        let mut delay = DelayLine::new(SAMPLE_RATE, 2.0, CHANNELS);
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                let params = DelayParams {
                    time: Modulation::Block(0.25),
                    feedback: 0.5,
                    mix: 0.5,
                };
                delay.process(black_box(&mut buffer), size, CHANNELS, black_box(params));
            })
        });

        // Time swept per frame: fractional reads everywhere
        let sweep: Vec<f32> = (0..size)
            .map(|i| 0.01 + 0.005 * (i as f32 / size as f32))
            .collect();
        let mut delay = DelayLine::new(SAMPLE_RATE, 2.0, CHANNELS);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                let params = DelayParams {
                    time: Modulation::Audio {
                        samples: &sweep,
                        channels: 1,
                    },
                    feedback: 0.3,
                    mix: 0.5,
                };
                delay.process(black_box(&mut buffer), size, CHANNELS, black_box(params));
            })
        });
    }

    group.finish();
}
