use std::{f32::consts::PI, sync::Arc};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::engine::TapReader;

/*
Spectrum Analyzer
=================

Consumes tap samples on the observer side and produces a magnitude
spectrum of the most recent window:

    TapReader ─→ channel 0 ─→ history (last N samples) ─→ Hann ─→ FFT ─→ |X[k]|

The analyzer never touches the graph. It sees only what the tap copied, so
a node that was not rendered contributes nothing new.

Magnitudes are normalized so a full-scale sine sitting on a bin centre reads
1.0 in that bin.
*/

const MIN_SIZE: usize = 16;

pub struct SpectrumAnalyzer {
    sample_rate: f32,
    size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    norm: f32,
    history: Vec<f32>,
    incoming: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// `size` is rounded up to a power of two.
    pub fn new(sample_rate: f32, size: usize) -> Self {
        let size = size.max(MIN_SIZE).next_power_of_two();
        let window = hann_window(size);
        let window_sum: f32 = window.iter().sum();
        let fft = FftPlanner::new().plan_fft_forward(size);

        Self {
            sample_rate,
            size,
            fft,
            window,
            norm: 2.0 / window_sum,
            history: vec![0.0; size],
            incoming: Vec::with_capacity(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
            magnitudes: vec![0.0; size / 2],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of magnitude bins (`size / 2`).
    pub fn bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Centre frequency of `bin`, in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / self.size as f32
    }

    /// Append mono samples, keeping only the most recent window.
    pub fn push(&mut self, samples: &[f32]) {
        if samples.len() >= self.size {
            self.history
                .copy_from_slice(&samples[samples.len() - self.size..]);
            return;
        }
        self.history.rotate_left(samples.len());
        let start = self.size - samples.len();
        self.history[start..].copy_from_slice(samples);
    }

    /// Drain channel 0 of everything the tap has captured. Returns `false`
    /// when nothing new arrived.
    pub fn update(&mut self, reader: &mut TapReader) -> bool {
        self.incoming.clear();
        if reader.drain_mono_into(&mut self.incoming) == 0 {
            return false;
        }
        let incoming = std::mem::take(&mut self.incoming);
        self.push(&incoming);
        self.incoming = incoming;
        true
    }

    /// Magnitude spectrum of the current window.
    pub fn analyze(&mut self) -> &[f32] {
        for ((slot, &sample), &w) in self
            .buffer
            .iter_mut()
            .zip(self.history.iter())
            .zip(self.window.iter())
        {
            let value = if sample.is_finite() { sample * w } else { 0.0 };
            *slot = Complex::new(value, 0.0);
        }

        self.fft.process(&mut self.buffer);

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(self.buffer.iter()) {
            *magnitude = bin.norm() * self.norm;
        }
        &self.magnitudes
    }

    /// Frequency and magnitude of the loudest bin after the last
    /// [`analyze`](Self::analyze), ignoring DC.
    pub fn peak(&self) -> Option<(f32, f32)> {
        self.magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .filter(|(_, magnitude)| **magnitude > 0.0)
            .map(|(bin, &magnitude)| (self.bin_frequency(bin), magnitude))
    }

    pub fn clear(&mut self) {
        self.history.fill(0.0);
        self.magnitudes.fill(0.0);
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
