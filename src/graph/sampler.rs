use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    dsp::trigger::{classify, Edge, EdgeDetector, TriggerKind},
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
    Error, Result,
};

/*
Sampler
=======

Plays an interleaved sample buffer. Playback starts from two places:

  - a rising edge on the `trigger` input (audio rate, exact frame)
  - `SamplerHandle::play()` from the control path

With `hold` on, a held gate on `trigger` plays only while it stays high and
its falling edge stops playback. A one-frame pulse always plays the whole
sample. An edge on the last frame of a buffer cannot be told apart yet and
counts as a gate.

Both touch the same transport (playing flag and read position), so the
transport sits behind a mutex. This is the one node whose state is shared
with code outside the audio callback. The critical sections on both sides
are a handful of field writes.

Speed
-----

    rate = speed × 2 ^ cv        cv from the `speed` input, block rate

Reads between sample frames are linearly interpolated. Sample channels map
onto output channels modulo the sample's channel count, so a mono sample
plays on every output channel.
*/

static INPUTS: [PortSpec; 2] = [PortSpec::audio("trigger"), PortSpec::block("speed")];
const TRIGGER: usize = 0;
const SPEED_CV: usize = 1;

static PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("speed", 1.0, 0.0, 4.0),
    ParamSpec::new("gain", 1.0, 0.0, 2.0),
    ParamSpec::new("loop", 0.0, 0.0, 1.0),
    ParamSpec::new("hold", 0.0, 0.0, 1.0),
];
const SPEED: usize = 0;
const GAIN: usize = 1;
const LOOP: usize = 2;
const HOLD: usize = 3;

#[derive(Debug, Default)]
struct Transport {
    playing: bool,
    position: f64,
    /// Stop on the trigger's falling edge.
    gated: bool,
}

impl Transport {
    fn restart(&mut self) {
        self.playing = true;
        self.position = 0.0;
        self.gated = false;
    }
}

/// Control-path handle for starting and stopping a sampler.
#[derive(Debug, Clone)]
pub struct SamplerHandle {
    transport: Arc<Mutex<Transport>>,
}

impl SamplerHandle {
    /// Restart playback from the beginning.
    pub fn play(&self) {
        self.transport.lock().restart();
        debug!("sampler play");
    }

    pub fn stop(&self) {
        self.transport.lock().playing = false;
        debug!("sampler stop");
    }

    pub fn is_playing(&self) -> bool {
        self.transport.lock().playing
    }
}

pub struct SamplerNode {
    samples: Arc<[f32]>,
    channels: usize,
    frames: usize,
    transport: Arc<Mutex<Transport>>,
    edge: EdgeDetector,
}

impl SamplerNode {
    /// `samples` are interleaved with `channels` channels.
    pub fn new(samples: impl Into<Arc<[f32]>>, channels: usize) -> Result<(Self, SamplerHandle)> {
        let samples = samples.into();
        if channels == 0 || channels > crate::MAX_CHANNELS {
            return Err(Error::InvalidChannelCount(channels));
        }
        let frames = samples.len() / channels;
        if frames == 0 {
            return Err(Error::EmptySample);
        }

        let transport = Arc::new(Mutex::new(Transport::default()));
        let handle = SamplerHandle {
            transport: transport.clone(),
        };
        let node = Self {
            samples,
            channels,
            frames,
            transport,
            edge: EdgeDetector::new(),
        };
        Ok((node, handle))
    }

    #[inline]
    fn read(&self, position: f64, channel: usize) -> f32 {
        let whole = position.floor();
        let frac = (position - whole) as f32;
        let index = whole as usize;
        let channel = channel % self.channels;

        let a = self.samples[index * self.channels + channel];
        let b = if index + 1 < self.frames {
            self.samples[(index + 1) * self.channels + channel]
        } else {
            a
        };
        a + (b - a) * frac
    }
}

impl Processor for SamplerNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Sampler
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let channels = ctx.channels.max(1);
        let rate = f64::from(io.param(SPEED) * 2.0_f32.powf(io.block(SPEED_CV).unwrap_or(0.0)));
        let rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
        let gain = io.param(GAIN);
        let looping = io.param(LOOP) >= 0.5;
        let hold = io.param(HOLD) >= 0.5;
        let trigger = io.input(TRIGGER);
        let end = self.frames as f64;

        let mut transport = self.transport.lock();

        for (frame, chunk) in out.chunks_mut(channels).take(ctx.frames).enumerate() {
            if let Some(trigger) = trigger {
                let sample = trigger.get(frame * channels).copied().unwrap_or(0.0);
                match self.edge.step(sample) {
                    Some(Edge::Rising) => {
                        transport.restart();
                        transport.gated =
                            hold && classify(trigger, frame, channels) == TriggerKind::Gate;
                    }
                    Some(Edge::Falling) if transport.gated => {
                        transport.playing = false;
                        transport.position = 0.0;
                    }
                    _ => {}
                }
            }
            if !transport.playing {
                continue;
            }

            for (channel, sample) in chunk.iter_mut().enumerate() {
                *sample = self.read(transport.position, channel) * gain;
            }

            transport.position += rate;
            if transport.position >= end {
                if looping {
                    transport.position %= end;
                } else {
                    transport.playing = false;
                    transport.position = 0.0;
                }
            }
        }
    }

    fn reset(&mut self) {
        let mut transport = self.transport.lock();
        *transport = Transport::default();
        self.edge.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        node::{Node, NodeRef},
        port::connect,
        pulse::PulseNode,
    };

    fn render(node: &NodeRef, frames: usize, channels: usize, timestamp: u64) -> Vec<f32> {
        let mut out = vec![0.0; frames * channels];
        node.render(&mut out, &AudioContext::new(1_000.0, frames, channels, timestamp));
        out
    }

    #[test]
    fn rejects_empty_sample() {
        assert!(matches!(SamplerNode::new(Vec::new(), 1), Err(Error::EmptySample)));
        assert!(matches!(
            SamplerNode::new(vec![0.0; 4], 0),
            Err(Error::InvalidChannelCount(0))
        ));
    }

    #[test]
    fn play_from_control_path() {
        let (sampler, handle) = SamplerNode::new(vec![0.1, 0.2, 0.3], 1).unwrap();
        let node = Node::new(sampler);

        assert_eq!(render(&node, 4, 1, 1), vec![0.0; 4]);

        handle.play();
        let out = render(&node, 4, 1, 2);
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.0]);
        assert!(!handle.is_playing());
    }

    #[test]
    fn trigger_input_restarts_on_exact_frame() {
        let (sampler, _handle) = SamplerNode::new(vec![0.5, 0.25], 1).unwrap();
        let node = Node::new(sampler);
        let clock = Node::new(PulseNode::new(1_000.0));
        clock.set_param("rate", 250.0).unwrap();
        connect(&clock, node.input("trigger").unwrap()).unwrap();

        let out = render(&node, 8, 1, 1);
        assert_eq!(out, vec![0.5, 0.25, 0.0, 0.0, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn mono_sample_fills_stereo_and_loops() {
        let (sampler, handle) = SamplerNode::new(vec![1.0, -1.0], 1).unwrap();
        let node = Node::new(sampler);
        node.set_param("loop", 1.0).unwrap();
        handle.play();

        let out = render(&node, 3, 2, 1);
        assert_eq!(out, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0]);
        assert!(handle.is_playing());
    }

    /// Plays back a fixed mono buffer.
    struct Fixed(Vec<f32>);

    impl Processor for Fixed {
        fn kind(&self) -> NodeKind {
            NodeKind::Custom
        }

        fn process(&mut self, _io: &NodeIo<'_>, out: &mut [f32], _ctx: &AudioContext) {
            out.copy_from_slice(&self.0[..out.len()]);
        }
    }

    #[test]
    fn held_gate_stops_on_release_but_pulse_plays_through() {
        let (sampler, _handle) = SamplerNode::new(vec![0.5; 16], 1).unwrap();
        let node = Node::new(sampler);
        node.set_param("hold", 1.0).unwrap();
        let gate = Node::new(Fixed(vec![1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        connect(&gate, node.input("trigger").unwrap()).unwrap();

        let out = render(&node, 8, 1, 1);
        assert_eq!(out, vec![0.5, 0.5, 0.5, 0.0, 0.0, 0.5, 0.5, 0.5]);
    }
}
