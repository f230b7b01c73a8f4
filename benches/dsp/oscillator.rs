//! Benchmarks for the phase-accumulator oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::dsp::{
    modulate::Modulation,
    oscillator::{OscParams, Oscillator, Waveform},
    Kernel,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

fn params(waveform: Waveform, fm: Modulation<'_>) -> OscParams<'_> {
    OscParams {
        waveform,
        frequency: 440.0,
        fm,
        fm_depth: 1.0,
        amplitude: 1.0,
        am: None,
        sync: None,
    }
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size * CHANNELS];

        for (name, waveform) in [
            ("sine", Waveform::Sine),
            ("saw", Waveform::Saw),
            ("square", Waveform::Square),
            ("triangle", Waveform::Triangle),
            ("noise", Waveform::Noise),
        ] {
            let mut osc = Oscillator::with_seed(SAMPLE_RATE, 7);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let p = params(waveform, Modulation::Block(0.0));
                    osc.process(black_box(&mut buffer), size, CHANNELS, black_box(p));
                })
            });
        }

        // Audio-rate FM from a second buffer
        let modulator: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32 * std::f32::consts::TAU).sin())
            .collect();
        let mut osc = Oscillator::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sine_fm", size), &size, |b, _| {
            b.iter(|| {
                let fm = Modulation::Audio {
                    samples: &modulator,
                    channels: 1,
                };
                osc.process(
                    black_box(&mut buffer),
                    size,
                    CHANNELS,
                    black_box(params(Waveform::Sine, fm)),
                );
            })
        });
    }

    group.finish();
}
