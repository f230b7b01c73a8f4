use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
    },
    MAX_CHANNELS,
};

/*
External Input
==============

A source fed from outside the graph, typically a microphone captured by the
host on another thread. Samples arrive interleaved through a lock-free SPSC
ring:

    capture thread ── Producer ──▶ ring ──▶ Consumer ── ExternalInputNode

Each rendered frame pops one frame of `source_channels` samples. If the ring
runs dry the rest of the buffer is silence (never a stall). Source channels
are mapped onto output channels modulo the source count, so a mono mic fills
every output channel; extra source channels are dropped.
*/

static PARAMS: [ParamSpec; 1] = [ParamSpec::new("gain", 1.0, 0.0, 4.0)];
const GAIN: usize = 0;

pub struct ExternalInputNode {
    consumer: Consumer<f32>,
    source_channels: usize,
}

impl ExternalInputNode {
    pub fn new(consumer: Consumer<f32>, source_channels: usize) -> Self {
        Self {
            consumer,
            source_channels: source_channels.clamp(1, MAX_CHANNELS),
        }
    }

    /// Create the node together with the producer end of its ring.
    pub fn with_capacity(source_channels: usize, capacity_frames: usize) -> (Producer<f32>, Self) {
        let source_channels = source_channels.clamp(1, MAX_CHANNELS);
        let (producer, consumer) = RingBuffer::new(capacity_frames.max(1) * source_channels);
        (producer, Self::new(consumer, source_channels))
    }

    /// Samples waiting in the ring.
    pub fn buffered(&self) -> usize {
        self.consumer.slots()
    }
}

impl Processor for ExternalInputNode {
    fn kind(&self) -> NodeKind {
        NodeKind::ExternalInput
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let channels = ctx.channels.max(1);
        let gain = io.param(GAIN);
        let mut frame = [0.0f32; MAX_CHANNELS];

        for chunk in out.chunks_mut(channels).take(ctx.frames) {
            // Only whole frames are consumed, so channels never drift.
            if self.consumer.slots() < self.source_channels {
                break;
            }
            for slot in frame.iter_mut().take(self.source_channels) {
                *slot = self.consumer.pop().unwrap_or(0.0);
            }
            for (channel, sample) in chunk.iter_mut().enumerate() {
                *sample = frame[channel % self.source_channels] * gain;
            }
        }
    }
}
