//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    filter::{FilterMode, FilterParams, SVFilter},
    Kernel,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp on both channels
        let input: Vec<f32> = (0..size * CHANNELS)
            .map(|i| ((i / CHANNELS) as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for (name, mode) in [
            ("lowpass", FilterMode::LowPass),
            ("highpass", FilterMode::HighPass),
            ("bandpass", FilterMode::BandPass),
            ("notch", FilterMode::Notch),
        ] {
            let mut filter = SVFilter::new(SAMPLE_RATE);
            let params = FilterParams {
                mode,
                cutoff_hz: 1_000.0,
                resonance: 0.5,
            };
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.process(black_box(&mut buffer), size, CHANNELS, black_box(params));
                })
            });
        }
    }

    group.finish();
}
