use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    dsp::{
        modulate::{first_frame, Modulation},
        numeric::sanitize,
    },
    graph::{
        buffer::ScratchBuffer,
        cache::RenderCache,
        param::{Param, ParamSpec},
        port::{ControlRate, Port, PortSpec},
    },
    Error, Result, MAX_BLOCK_SIZE, MAX_CHANNELS,
};

/*
The Render Contract
===================

Every node exposes one operation:

    render(out, ctx)     fill `out` with ctx.frames × ctx.channels interleaved
                         samples for logical time ctx.timestamp

`Node::render` wraps the node's `Processor` in the same sequence of checks
every time, so no processor has to think about graph concerns:

    1. recursion guard   already visiting?  → silence (cycle break)
    2. state lock        contended?         → silence
    3. cache             rendered at T?     → copy cached buffer
    4. pull inputs       each patched port rendered into a zeroed scratch
    5. process           out zeroed, then the processor writes it
    6. scrub             NaN / ±Inf         → 0.0
    7. store             (T, out) kept for the next consumer at T

Cycles
------

Wiring a node's output back into its own input (directly or through other
nodes) is legal. The second arrival at a node that is still rendering sees
its `visiting` flag and returns silence. The guard is released by `Drop`, so
every exit path clears it.

    A ──→ B ──→ A (visiting: returns zeros)

This is NOT a one-sample feedback delay: the re-entrant branch contributes
nothing for that callback. Patches that want real feedback use the delay
node's feedback control.

Fan-out
-------

The cache makes a node with several consumers compute exactly once per
timestamp; every consumer gets a byte-identical copy. A splitter feeding
three destinations costs one render plus two copies.
*/

/// Shared handle to a node. Ports hold the weak side.
pub type NodeRef = Arc<Node>;

/// Everything a render call needs to know, passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioContext {
    pub sample_rate: f32,
    pub frames: usize,
    pub channels: usize,
    /// Logical time of the callback; the cache key.
    pub timestamp: u64,
}

impl AudioContext {
    pub fn new(sample_rate: f32, frames: usize, channels: usize, timestamp: u64) -> Self {
        Self {
            sample_rate,
            frames,
            channels,
            timestamp,
        }
    }

    /// Interleaved samples in one buffer: `frames × channels`.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_frames(self, frames: usize) -> Self {
        Self { frames, ..self }
    }

    pub fn with_timestamp(self, timestamp: u64) -> Self {
        Self { timestamp, ..self }
    }

    /// Seconds spanned by one buffer.
    pub fn duration(&self) -> f32 {
        self.frames as f32 / self.sample_rate
    }
}

/// Closed set of node kinds. `Custom` covers processors defined outside
/// this crate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Oscillator,
    Sampler,
    ExternalInput,
    Control,
    AdEnvelope,
    AdsrEnvelope,
    Pulse,
    Delay,
    Filter,
    Reverb,
    Mixer,
    Multiple,
    Crossfader,
    Amplifier,
    Speaker,
    Custom,
}

impl NodeKind {
    /// Sinks are roots of a render pull.
    pub fn is_sink(self) -> bool {
        matches!(self, NodeKind::Speaker)
    }
}

/// The per-kind render capability.
pub trait Processor: Send + 'static {
    fn kind(&self) -> NodeKind;

    /// Input ports, in index order.
    fn inputs(&self) -> &'static [PortSpec] {
        &[]
    }

    /// Parameters, in index order.
    fn params(&self) -> &'static [ParamSpec] {
        &[]
    }

    /// Write one buffer into `out`, which arrives zeroed.
    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext);

    /// Drop all DSP state (phase, envelope stage, delay contents).
    fn reset(&mut self) {}
}

#[derive(Debug)]
struct InputSlot {
    buffer: ScratchBuffer,
    connected: bool,
}

/// A processor's view of its already-pulled inputs and current knob values.
pub struct NodeIo<'a> {
    ports: &'a [Port],
    slots: &'a [InputSlot],
    params: &'a [Param],
    channels: usize,
}

impl<'a> NodeIo<'a> {
    /// Samples pulled from input `index`, or `None` when unpatched.
    #[inline]
    pub fn input(&self, index: usize) -> Option<&'a [f32]> {
        let slot = self.slots.get(index)?;
        slot.connected.then(|| slot.buffer.as_slice())
    }

    pub fn is_connected(&self, index: usize) -> bool {
        self.input(index).is_some()
    }

    /// Block-rate read: channel 0 of frame 0.
    #[inline]
    pub fn block(&self, index: usize) -> Option<f32> {
        self.input(index).map(first_frame)
    }

    /// Input `index` read at the rate its port declares.
    pub fn modulation(&self, index: usize) -> Option<Modulation<'a>> {
        let samples = self.input(index)?;
        Some(match self.ports[index].rate() {
            ControlRate::Block => Modulation::Block(first_frame(samples)),
            ControlRate::Audio => Modulation::Audio {
                samples,
                channels: self.channels,
            },
        })
    }

    /// Current value of parameter `index`; 0.0 if out of range.
    #[inline]
    pub fn param(&self, index: usize) -> f32 {
        self.params.get(index).map_or(0.0, Param::get)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

struct NodeState {
    processor: Box<dyn Processor>,
    slots: Vec<InputSlot>,
    cache: RenderCache,
}

/// Sets `visiting` for its lifetime.
struct VisitGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> VisitGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for VisitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Node {
    kind: NodeKind,
    inputs: Box<[Port]>,
    params: Box<[Param]>,
    visiting: AtomicBool,
    fan_out: AtomicUsize,
    state: Mutex<NodeState>,
}

impl Node {
    /// Wrap a processor into a patchable node.
    pub fn new(processor: impl Processor) -> NodeRef {
        Self::from_boxed(Box::new(processor))
    }

    pub fn from_boxed(processor: Box<dyn Processor>) -> NodeRef {
        // Widest layout at the largest block, so render never grows a buffer.
        let reserve = MAX_BLOCK_SIZE * MAX_CHANNELS;
        let inputs: Box<[Port]> = processor.inputs().iter().map(Port::new).collect();
        let params: Box<[Param]> = processor.params().iter().map(Param::new).collect();
        let slots = (0..inputs.len())
            .map(|_| InputSlot {
                buffer: ScratchBuffer::with_capacity(reserve),
                connected: false,
            })
            .collect();

        Arc::new(Self {
            kind: processor.kind(),
            inputs,
            params,
            visiting: AtomicBool::new(false),
            fan_out: AtomicUsize::new(0),
            state: Mutex::new(NodeState {
                processor,
                slots,
                cache: RenderCache::with_capacity(reserve),
            }),
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Input port by name.
    pub fn input(&self, name: &str) -> Result<&Port> {
        self.inputs
            .iter()
            .find(|port| port.name() == name)
            .ok_or_else(|| Error::UnknownPort {
                node: self.kind,
                port: name.to_string(),
            })
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter by name.
    pub fn param(&self, name: &str) -> Result<&Param> {
        self.params
            .iter()
            .find(|param| param.name() == name)
            .ok_or_else(|| Error::UnknownParam {
                node: self.kind,
                param: name.to_string(),
            })
    }

    /// Set a parameter by name. Non-finite values are dropped with a warning.
    pub fn set_param(&self, name: &str, value: f32) -> Result<()> {
        let param = self.param(name)?;
        if !param.set(value) {
            warn!(node = ?self.kind, param = name, value, "ignored non-finite parameter value");
        }
        Ok(())
    }

    /// Number of ports currently fed by this node.
    pub fn fan_out(&self) -> usize {
        self.fan_out.load(Ordering::Acquire)
    }

    pub(crate) fn fan_out_counter(&self) -> &AtomicUsize {
        &self.fan_out
    }

    pub(crate) fn release_fan_out(&self) {
        let _ = self
            .fan_out
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));
    }

    /// True while a render of this node is on the stack.
    pub fn is_visiting(&self) -> bool {
        self.visiting.load(Ordering::Acquire)
    }

    /// Render one buffer for `ctx.timestamp` into `out`.
    ///
    /// The frame count is taken from `out.len() / ctx.channels`; `out` is always
    /// fully written (silence on re-entry or contention).
    pub fn render(&self, out: &mut [f32], ctx: &AudioContext) {
        let Some(_visit) = VisitGuard::enter(&self.visiting) else {
            out.fill(0.0);
            return;
        };
        let Some(mut guard) = self.state.try_lock() else {
            out.fill(0.0);
            return;
        };
        let state = &mut *guard;

        if state.cache.copy_if_fresh(ctx.timestamp, out) {
            return;
        }

        let channels = ctx.channels.max(1);
        let ctx = ctx.with_frames(out.len() / channels);

        for (port, slot) in self.inputs.iter().zip(state.slots.iter_mut()) {
            slot.buffer.resize(out.len());
            slot.connected = port.pull(slot.buffer.as_mut_slice(), &ctx);
        }

        out.fill(0.0);
        let io = NodeIo {
            ports: &self.inputs,
            slots: &state.slots,
            params: &self.params,
            channels,
        };
        state.processor.process(&io, out, &ctx);
        sanitize(out);

        state.cache.store(ctx.timestamp, out);
    }

    /// Copy this node's output for `ctx.timestamp` without rendering.
    ///
    /// Returns `false` if the node has not rendered at that timestamp or is
    /// busy; `out` is left untouched in that case.
    pub fn peek(&self, out: &mut [f32], ctx: &AudioContext) -> bool {
        match self.state.try_lock() {
            Some(state) => state.cache.copy_if_fresh(ctx.timestamp, out),
            None => false,
        }
    }

    /// Timestamp of the most recent render, if the state is not busy.
    pub fn last_rendered(&self) -> Option<u64> {
        self.state.try_lock().and_then(|state| state.cache.timestamp())
    }

    /// Clear DSP state and the cache. Control path only: this blocks.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.processor.reset();
        state.cache.clear();
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("fan_out", &self.fan_out())
            .finish()
    }
}
