use std::sync::Weak;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::graph::node::{AudioContext, Node};

/*
Observation Taps
================

A tap copies a node's output out of the audio thread for display or
analysis, without taking part in the graph:

    sinks render ─→ node cache at T ─→ peek ─→ ring ─→ TapReader (UI thread)

The tap never renders and never writes to the node. It reads the cache the
node filled while the sinks were pulled. A node that was not reached in
this callback has no fresh cache, so nothing is pushed for that callback.

The ring is lossy at the producer: when the reader falls behind, frames
that do not fit are dropped rather than blocking the audio thread.

The reader's channel count is fixed when the tap is created. A callback
rendered at another width is mapped onto it frame by frame (source channel
`c % source_channels`), and only whole frames enter or leave the ring, so
readers never drift off frame boundaries.
*/

pub(crate) struct Tap {
    node: Weak<Node>,
    producer: Producer<f32>,
    scratch: Vec<f32>,
    channels: usize,
}

impl Tap {
    pub(crate) fn new(
        node: Weak<Node>,
        producer: Producer<f32>,
        max_samples: usize,
        channels: usize,
    ) -> Self {
        Self {
            node,
            producer,
            scratch: vec![0.0; max_samples],
            channels: channels.max(1),
        }
    }

    /// Copy the node's buffer for `ctx` into the ring. Returns `false` once
    /// the node or the reader is gone, so the evaluator can drop the tap.
    pub(crate) fn capture(&mut self, ctx: &AudioContext) -> bool {
        if self.producer.is_abandoned() {
            return false;
        }
        let Some(node) = self.node.upgrade() else {
            return false;
        };

        let len = ctx.len().min(self.scratch.len());
        let window = &mut self.scratch[..len];
        if node.peek(window, ctx) {
            let source = ctx.channels.max(1);
            let frames = (len / source).min(self.producer.slots() / self.channels);
            for frame in window.chunks_exact(source).take(frames) {
                for channel in 0..self.channels {
                    if self.producer.push(frame[channel % source]).is_err() {
                        return true;
                    }
                }
            }
        }
        true
    }
}

/// Reader side of a tap, owned by the observer.
pub struct TapReader {
    consumer: Consumer<f32>,
    channels: usize,
}

impl TapReader {
    pub(crate) fn channel(capacity: usize, channels: usize) -> (Producer<f32>, TapReader) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        (
            producer,
            TapReader {
                consumer,
                channels: channels.max(1),
            },
        )
    }

    /// Interleaved channel count of the tapped samples.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples waiting to be read.
    pub fn available(&self) -> usize {
        self.consumer.slots()
    }

    /// Move as many whole frames as fit into `out`, returning the sample count.
    pub fn read(&mut self, out: &mut [f32]) -> usize {
        let whole = out.len().min(self.consumer.slots()) / self.channels * self.channels;
        let mut read = 0;
        for slot in out[..whole].iter_mut() {
            match self.consumer.pop() {
                Ok(sample) => {
                    *slot = sample;
                    read += 1;
                }
                Err(_) => break,
            }
        }
        read
    }

    /// Append everything waiting to `out`.
    pub fn drain_into(&mut self, out: &mut Vec<f32>) -> usize {
        let before = out.len();
        while let Ok(sample) = self.consumer.pop() {
            out.push(sample);
        }
        out.len() - before
    }

    /// Channel 0 of every waiting frame, appended to `out`.
    pub fn drain_mono_into(&mut self, out: &mut Vec<f32>) -> usize {
        let before = out.len();
        let mut index = 0;
        while let Ok(sample) = self.consumer.pop() {
            if index % self.channels == 0 {
                out.push(sample);
            }
            index += 1;
        }
        out.len() - before
    }
}
