use crate::dsp::{kernel::Kernel, modulate::Modulation, numeric::clamp_finite};

/*
Feedback Delay Line
===================

A circular buffer of interleaved frames. Each frame we read the sample from
`delay` frames ago, then write the input plus a share of what we read:

    delayed = line[write - delay]
    line[write] = input + delayed × feedback
    output = input × (1 − mix) + delayed × mix

Delay time arrives at AUDIO rate (one value per frame), because modulating
it is how chorus, flanger and tape-wobble effects work. Fractional delays
are read with linear interpolation between the two neighbouring frames so a
sweeping time glides instead of clicking.

Feedback is clamped below 1.0; at 1.0 the loop never decays.
*/

/// Largest feedback accepted; keeps the loop gain strictly below unity.
pub const MAX_FEEDBACK: f32 = 0.99;

/// Per-call parameters for [`DelayLine`].
#[derive(Debug, Clone, Copy)]
pub struct DelayParams<'a> {
    /// Delay time in seconds, per frame.
    pub time: Modulation<'a>,
    pub feedback: f32,
    pub mix: f32,
}

pub struct DelayLine {
    buffer: Vec<f32>,
    capacity: usize,
    channels: usize,
    write_pos: usize,
    sample_rate: f32,
}

impl DelayLine {
    /// Allocate `max_seconds` of delay for `channels` interleaved channels.
    pub fn new(sample_rate: f32, max_seconds: f32, channels: usize) -> Self {
        let channels = channels.max(1);
        // Two guard frames so the interpolated read never touches the write head.
        let capacity = ((max_seconds.max(0.0) * sample_rate) as usize).max(1) + 2;
        Self {
            buffer: vec![0.0; capacity * channels],
            capacity,
            channels,
            write_pos: 0,
            sample_rate,
        }
    }

    /// Longest usable delay, in frames.
    pub fn max_delay_frames(&self) -> f32 {
        (self.capacity - 2) as f32
    }

    /// Read `channel` from `delay` frames ago, linearly interpolated.
    pub fn read_interpolated(&self, channel: usize, delay: f32) -> f32 {
        let delay = clamp_finite(delay, 1.0, self.max_delay_frames().max(1.0), 1.0);
        let whole = delay.floor();
        let frac = delay - whole;

        let newer = (self.write_pos + self.capacity - whole as usize) % self.capacity;
        let older = (newer + self.capacity - 1) % self.capacity;

        let a = self.buffer[newer * self.channels + channel];
        let b = self.buffer[older * self.channels + channel];
        a + (b - a) * frac
    }

    /// Write one sample for `channel` at the write head.
    #[inline]
    pub fn write(&mut self, channel: usize, sample: f32) {
        self.buffer[self.write_pos * self.channels + channel] = sample;
    }

    /// Move the write head forward one frame.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }
}

impl<'a> Kernel<DelayParams<'a>> for DelayLine {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: DelayParams<'a>) {
        let channels = channels.max(1);
        let feedback = clamp_finite(params.feedback, 0.0, MAX_FEEDBACK, 0.0);
        let mix = clamp_finite(params.mix, 0.0, 1.0, 0.0);

        for (frame, chunk) in buffer.chunks_mut(channels).take(frames).enumerate() {
            let delay = params.time.at(frame) * self.sample_rate;

            for (channel, sample) in chunk.iter_mut().enumerate() {
                // Channels beyond the allocated line pass through dry.
                if channel >= self.channels {
                    continue;
                }
                let dry = *sample;
                let delayed = self.read_interpolated(channel, delay);
                self.write(channel, dry + delayed * feedback);
                *sample = dry * (1.0 - mix) + delayed * mix;
            }
            self.advance();
        }
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
