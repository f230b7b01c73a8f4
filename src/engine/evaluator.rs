use std::sync::{atomic::Ordering, Arc};

use arc_swap::ArcSwap;
use atomic_float::AtomicF32;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    dsp::{
        mix::sum_in_place,
        numeric::{hard_clip, sanitize},
    },
    engine::{
        pool::BufferPool,
        tap::{Tap, TapReader},
    },
    graph::{
        node::{AudioContext, NodeRef},
        port::{connect_with_limit, Port},
    },
    EngineConfig, Error, Result, MAX_CHANNELS,
};

/*
The Host Callback
=================

    process(output, frames, channels)

    ┌────────────┐   pull   ┌─────────┐  pull  ┌─────┐  pull  ┌─────┐
    │ evaluator  │ ───────→ │ speaker │ ─────→ │ vca │ ─────→ │ osc │
    └────────────┘          └─────────┘        └─────┘        └─────┘
          │ sum sinks, gain, scrub, clip
          ▼
       output

Per callback:

  1. drain control commands (new taps)
  2. split the request into chunks of at most `max_block_frames`
  3. per chunk: new logical timestamp, render every sink into a pooled
     buffer, sum, apply output gain, scrub non-finite, clip to [-1, 1]
  4. per chunk: let every tap copy its node's cached buffer
  5. zero any part of `output` beyond frames × channels

Logical Timestamps
------------------

Host timestamps are never used as cache keys directly. Each callback whose
timestamp differs from the previous one opens a new callback number `n`, and
chunk `k` of it renders at key `n << 16 | k`:

    host:   10   10   11   2^48 + 11
    n:       1    1    2    3

so chunks of one oversized callback never collide with each other or with
the next callback, and any u64 the host supplies is usable. `process`
advances the host timestamp itself; `process_at` takes it from the host.
Asking for the same host timestamp twice in a row yields the cached output.
`n` wraps after 2^48 callbacks.

Control Side
------------

`EngineHandle` lives on the control thread. The sink list is swapped
atomically (copy, modify, publish); taps travel over a lock-free command
queue. The audio thread never waits on either.
*/

const CHUNK_BITS: u32 = 16;
const MAX_CHUNKS: usize = 1 << CHUNK_BITS;
const CALLBACK_MASK: u64 = u64::MAX >> CHUNK_BITS;
const COMMAND_CAPACITY: usize = 64;
const MAX_TAPS: usize = 32;

enum Command {
    AddTap(Tap),
}

#[inline]
fn chunk_key(callback: u64, chunk: usize) -> u64 {
    ((callback & CALLBACK_MASK) << CHUNK_BITS) | chunk as u64
}

/// Audio-thread half of the engine.
pub struct Evaluator {
    config: EngineConfig,
    sinks: Arc<ArcSwap<Vec<NodeRef>>>,
    gain: Arc<AtomicF32>,
    commands: Consumer<Command>,
    taps: Vec<Tap>,
    pool: BufferPool,
    timestamp: Option<u64>,
    callback: u64,
}

/// Control-thread half of the engine.
pub struct EngineHandle {
    config: EngineConfig,
    sinks: Arc<ArcSwap<Vec<NodeRef>>>,
    gain: Arc<AtomicF32>,
    commands: Producer<Command>,
}

impl Evaluator {
    pub fn new(config: EngineConfig) -> Result<(Evaluator, EngineHandle)> {
        config.validate()?;

        let sinks = Arc::new(ArcSwap::from_pointee(Vec::new()));
        let gain = Arc::new(AtomicF32::new(config.output_gain));
        let (producer, consumer) = RingBuffer::new(COMMAND_CAPACITY);

        let max_samples = config.max_block_frames * MAX_CHANNELS;
        let mut pool = BufferPool::new(max_samples);
        pool.prewarm(config.max_block_frames * config.channels, 2);

        info!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            max_block_frames = config.max_block_frames,
            "engine created"
        );

        let evaluator = Evaluator {
            config: config.clone(),
            sinks: sinks.clone(),
            gain: gain.clone(),
            commands: consumer,
            taps: Vec::with_capacity(MAX_TAPS),
            pool,
            timestamp: None,
            callback: 0,
        };
        let handle = EngineHandle {
            config,
            sinks,
            gain,
            commands: producer,
        };
        Ok((evaluator, handle))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Host timestamp of the most recent callback.
    pub fn timestamp(&self) -> u64 {
        self.timestamp.unwrap_or(0)
    }

    /// Logical timestamp chunk `chunk` of the most recent callback rendered
    /// at, for peeking node caches from outside the callback.
    pub fn render_timestamp(&self, chunk: usize) -> u64 {
        chunk_key(self.callback, chunk)
    }

    /// Fill `output` with `frames × channels` interleaved samples.
    pub fn process(&mut self, output: &mut [f32], frames: usize, channels: usize) {
        let timestamp = self.timestamp().wrapping_add(1);
        self.process_at(output, frames, channels, timestamp);
    }

    /// Same as [`process`](Self::process) with a host-supplied timestamp.
    ///
    /// Any `u64` is accepted. Repeating the previous timestamp replays the
    /// cached render; every other value renders afresh.
    pub fn process_at(&mut self, output: &mut [f32], frames: usize, channels: usize, timestamp: u64) {
        if self.timestamp != Some(timestamp) {
            self.callback = self.callback.wrapping_add(1);
            self.timestamp = Some(timestamp);
        }
        self.drain_commands();

        let channels = channels.max(1);
        let needed = (frames * channels).min(output.len()) / channels * channels;
        let (body, excess) = output.split_at_mut(needed);
        excess.fill(0.0);

        // Keep every chunk within the pool's largest buffer.
        let pool_frames = self.pool.max_samples() / channels;
        let chunk_frames = self.config.max_block_frames.min(pool_frames).max(1);

        for (index, chunk) in body.chunks_mut(chunk_frames * channels).enumerate() {
            if index >= MAX_CHUNKS {
                chunk.fill(0.0);
                continue;
            }
            let ctx = AudioContext::new(
                self.config.sample_rate,
                chunk.len() / channels,
                channels,
                chunk_key(self.callback, index),
            );
            self.render_chunk(chunk, &ctx);
            self.capture_taps(&ctx);
        }
    }

    fn render_chunk(&mut self, chunk: &mut [f32], ctx: &AudioContext) {
        chunk.fill(0.0);
        let mut scratch = self.pool.acquire(chunk.len());

        let sinks = self.sinks.load();
        for sink in sinks.iter() {
            sink.render(&mut scratch, ctx);
            sum_in_place(chunk, &scratch);
        }
        self.pool.release(scratch);

        let gain = self.gain.load(Ordering::Relaxed);
        if gain != 1.0 {
            for sample in chunk.iter_mut() {
                *sample *= gain;
            }
        }
        sanitize(chunk);
        hard_clip(chunk);
    }

    fn capture_taps(&mut self, ctx: &AudioContext) {
        self.taps.retain_mut(|tap| tap.capture(ctx));
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                Command::AddTap(tap) => {
                    if self.taps.len() < MAX_TAPS {
                        self.taps.push(tap);
                    }
                }
            }
        }
    }
}

impl EngineHandle {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register `node` as an output endpoint. Adding it twice is a no-op.
    pub fn add_sink(&self, node: &NodeRef) {
        self.sinks.rcu(|sinks| {
            let mut next = Vec::clone(sinks);
            if !next.iter().any(|sink| Arc::ptr_eq(sink, node)) {
                next.push(node.clone());
            }
            next
        });
        debug!(kind = ?node.kind(), "sink added");
    }

    /// Unregister `node`. Returns whether it was registered.
    pub fn remove_sink(&self, node: &NodeRef) -> bool {
        let previous = self.sinks.rcu(|sinks| {
            sinks
                .iter()
                .filter(|sink| !Arc::ptr_eq(sink, node))
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().any(|sink| Arc::ptr_eq(sink, node));
        if removed {
            debug!(kind = ?node.kind(), "sink removed");
        }
        removed
    }

    pub fn sinks(&self) -> Arc<Vec<NodeRef>> {
        self.sinks.load_full()
    }

    pub fn clear_sinks(&self) {
        self.sinks.store(Arc::new(Vec::new()));
    }

    /// Patch `source` into `port`, bounded by the configured fan-out limit.
    pub fn connect(&self, source: &NodeRef, port: &Port) -> Result<()> {
        connect_with_limit(source, port, self.config.max_fan_out)
    }

    /// Set the master output gain. Non-finite or negative values are ignored.
    pub fn set_output_gain(&self, gain: f32) {
        if gain.is_finite() && gain >= 0.0 {
            self.gain.store(gain, Ordering::Relaxed);
        } else {
            warn!(gain, "ignored invalid output gain");
        }
    }

    pub fn output_gain(&self) -> f32 {
        self.gain.load(Ordering::Relaxed)
    }

    /// Observe `node`'s output. `capacity` is the ring size in samples.
    pub fn add_tap(&mut self, node: &NodeRef, capacity: usize) -> Result<TapReader> {
        let (producer, reader) = TapReader::channel(capacity, self.config.channels);
        let max_samples = self.config.max_block_frames * MAX_CHANNELS;
        let tap = Tap::new(
            Arc::downgrade(node),
            producer,
            max_samples,
            self.config.channels,
        );

        self.commands
            .push(Command::AddTap(tap))
            .map_err(|_| Error::CommandQueueFull)?;
        debug!(kind = ?node.kind(), capacity, "tap added");
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        control::ControlNode,
        node::{Node, NodeIo, NodeKind, Processor},
        speaker::SpeakerNode,
    };

    struct Constant(f32);

    impl Processor for Constant {
        fn kind(&self) -> NodeKind {
            NodeKind::Custom
        }

        fn process(&mut self, _io: &NodeIo<'_>, out: &mut [f32], _ctx: &AudioContext) {
            out.fill(self.0);
        }
    }

    fn engine(config: EngineConfig) -> (Evaluator, EngineHandle) {
        Evaluator::new(config).unwrap()
    }

    #[test]
    fn empty_graph_is_silent() {
        let (mut evaluator, _handle) = engine(EngineConfig::default());
        let mut out = vec![1.0; 64];
        evaluator.process(&mut out, 32, 2);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn sums_sinks_and_clips() {
        let (mut evaluator, handle) = engine(EngineConfig::default());
        handle.add_sink(&Node::new(Constant(0.4)));
        handle.add_sink(&Node::new(Constant(0.4)));

        let mut out = vec![0.0; 8];
        evaluator.process(&mut out, 4, 2);
        assert!(out.iter().all(|&s| (s - 0.8).abs() < 1e-6));

        handle.add_sink(&Node::new(Constant(0.4)));
        evaluator.process(&mut out, 4, 2);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn output_gain_applies() {
        let (mut evaluator, handle) = engine(EngineConfig::default().with_output_gain(0.5));
        handle.add_sink(&Node::new(Constant(0.5)));

        let mut out = vec![0.0; 4];
        evaluator.process(&mut out, 2, 2);
        assert_eq!(out, vec![0.25; 4]);

        handle.set_output_gain(f32::NAN);
        assert_eq!(handle.output_gain(), 0.5);
    }

    #[test]
    fn excess_output_is_zeroed() {
        let (mut evaluator, handle) = engine(EngineConfig::default());
        handle.add_sink(&Node::new(Constant(0.5)));

        let mut out = vec![9.0; 10];
        evaluator.process(&mut out, 4, 2);
        assert_eq!(&out[..8], &[0.5; 8]);
        assert_eq!(&out[8..], &[0.0; 2]);
    }

    #[test]
    fn oversized_callback_is_chunked() {
        let config = EngineConfig::default().with_max_block_frames(16);
        let (mut evaluator, handle) = engine(config);
        handle.add_sink(&Node::new(Constant(0.25)));

        let mut out = vec![0.0; 100 * 2];
        evaluator.process(&mut out, 100, 2);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn removed_sink_goes_quiet() {
        let (mut evaluator, handle) = engine(EngineConfig::default());
        let sink = Node::new(Constant(0.5));
        handle.add_sink(&sink);
        handle.add_sink(&sink);
        assert_eq!(handle.sinks().len(), 1);

        assert!(handle.remove_sink(&sink));
        assert!(!handle.remove_sink(&sink));

        let mut out = vec![1.0; 4];
        evaluator.process(&mut out, 2, 2);
        assert_eq!(out, vec![0.0; 4]);
    }

    #[test]
    fn tap_sees_rendered_node_without_rendering_it() {
        let (mut evaluator, mut handle) = engine(EngineConfig::default());
        let dial = Node::new(ControlNode::new());
        dial.set_param("value", 0.5).unwrap();
        let speaker = Node::new(SpeakerNode::new());
        handle.connect(&dial, speaker.input("in").unwrap()).unwrap();
        handle.add_sink(&speaker);

        let mut reader = handle.add_tap(&dial, 64).unwrap();
        let mut out = vec![0.0; 8];
        evaluator.process(&mut out, 4, 2);

        let mut tapped = Vec::new();
        assert_eq!(reader.drain_into(&mut tapped), 8);
        assert_eq!(tapped, vec![0.5; 8]);

        // Not reachable from any sink: nothing to observe.
        let orphan = Node::new(Constant(0.1));
        let mut orphan_reader = handle.add_tap(&orphan, 64).unwrap();
        evaluator.process(&mut out, 4, 2);
        assert_eq!(orphan_reader.available(), 0);
    }

    #[test]
    fn repeated_host_timestamp_is_cached() {
        let (mut evaluator, handle) = engine(EngineConfig::default());
        let osc = Node::new(crate::graph::oscillator::OscillatorNode::noise(48_000.0));
        handle.add_sink(&osc);

        let mut a = vec![0.0; 64];
        let mut b = vec![0.0; 64];
        evaluator.process_at(&mut a, 32, 2, 10);
        evaluator.process_at(&mut b, 32, 2, 10);
        assert_eq!(a, b);

        evaluator.process_at(&mut b, 32, 2, 11);
        assert_ne!(a, b);
    }

    #[test]
    fn fan_out_limit_from_config() {
        let (_evaluator, handle) = engine(EngineConfig::default().with_max_fan_out(1));
        let dial = Node::new(ControlNode::new());
        let a = Node::new(SpeakerNode::new());
        let b = Node::new(SpeakerNode::new());

        handle.connect(&dial, a.input("in").unwrap()).unwrap();
        assert!(matches!(
            handle.connect(&dial, b.input("in").unwrap()),
            Err(Error::FanOutExceeded { limit: 1 })
        ));
    }

    /// Writes its frame index on every channel.
    struct FrameIndex;

    impl Processor for FrameIndex {
        fn kind(&self) -> NodeKind {
            NodeKind::Custom
        }

        fn process(&mut self, _io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
            for (frame, chunk) in out.chunks_mut(ctx.channels).enumerate() {
                chunk.fill(frame as f32);
            }
        }
    }

    #[test]
    fn tap_keeps_its_layout_when_the_host_width_changes() {
        let (mut evaluator, mut handle) = engine(EngineConfig::default().with_channels(2));
        let source = Node::new(FrameIndex);
        handle.add_sink(&source);
        let mut reader = handle.add_tap(&source, 64).unwrap();

        let mut mono = vec![0.0; 4];
        evaluator.process(&mut mono, 4, 1);
        let mut quad = vec![0.0; 8];
        evaluator.process(&mut quad, 2, 4);

        let mut tapped = Vec::new();
        assert_eq!(reader.drain_mono_into(&mut tapped), 6);
        assert_eq!(tapped, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn distant_host_timestamps_do_not_share_a_cache_entry() {
        let (mut evaluator, handle) = engine(EngineConfig::default());
        let osc = Node::new(crate::graph::oscillator::OscillatorNode::noise(48_000.0));
        handle.add_sink(&osc);

        let mut a = vec![0.0; 64];
        let mut b = vec![0.0; 64];
        evaluator.process_at(&mut a, 32, 2, 5);
        evaluator.process_at(&mut b, 32, 2, 5 + (1 << 48));
        assert_ne!(a, b);
        assert_eq!(evaluator.timestamp(), 5 + (1 << 48));
    }
}
