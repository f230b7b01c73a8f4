use std::sync::{atomic::Ordering, Arc, Weak};

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use crate::{
    graph::node::{AudioContext, Node, NodeRef},
    Error, Result, DEFAULT_MAX_FAN_OUT,
};

/*
Ports (Jacks)
=============

A port is an input socket on a node. It holds at most one reference to
another node's output, and it holds it WEAKLY: a port never keeps its source
alive. When the source module is removed the weak reference fails to
upgrade and the port simply reads as unpatched.

    ┌────────┐            ┌──────────────┐
    │  osc   │ ── Weak ── │ in  filter   │
    └────────┘            └──────────────┘

Rewiring is a single atomic pointer swap on the control thread. The audio
thread loads whatever reference is current when it pulls; a swap that lands
mid-callback is seen by the next pull at the latest.

Fan-out
-------

Every live connection increments the SOURCE node's fan-out counter and every
disconnect (or destruction of the port) decrements it. `connect` refuses to
push a node past its limit, which bounds how much work one node can attract.
*/

/// How often a node reads an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRate {
    /// Frame 0 only, held for the whole buffer.
    Block,
    /// Every frame.
    Audio,
}

/// Static description of an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub rate: ControlRate,
}

impl PortSpec {
    pub const fn audio(name: &'static str) -> Self {
        Self {
            name,
            rate: ControlRate::Audio,
        }
    }

    pub const fn block(name: &'static str) -> Self {
        Self {
            name,
            rate: ControlRate::Block,
        }
    }
}

pub struct Port {
    spec: &'static PortSpec,
    source: ArcSwapOption<Weak<Node>>,
}

impl Port {
    pub(crate) fn new(spec: &'static PortSpec) -> Self {
        Self {
            spec,
            source: ArcSwapOption::empty(),
        }
    }

    pub fn spec(&self) -> &'static PortSpec {
        self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn rate(&self) -> ControlRate {
        self.spec.rate
    }

    /// The connected node, if any and still alive.
    pub fn source(&self) -> Option<NodeRef> {
        let guard = self.source.load();
        match &*guard {
            Some(weak) => weak.upgrade(),
            None => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.source().is_some()
    }

    /// Render the connected source into `out`. Returns `false` (leaving `out`
    /// untouched) when nothing live is patched in.
    pub fn pull(&self, out: &mut [f32], ctx: &AudioContext) -> bool {
        match self.source() {
            Some(node) => {
                node.render(out, ctx);
                true
            }
            None => false,
        }
    }

    /// Swap in a new source, returning the previous one.
    fn replace(&self, source: Option<&NodeRef>) -> Option<NodeRef> {
        let next = source.map(|node| Arc::new(Arc::downgrade(node)));
        let previous = self.source.swap(next);
        previous.and_then(|weak| weak.upgrade())
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        if let Some(previous) = self.replace(None) {
            previous.release_fan_out();
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.spec.name)
            .field("rate", &self.spec.rate)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Patch `source` into `port` using the default fan-out limit.
pub fn connect(source: &NodeRef, port: &Port) -> Result<()> {
    connect_with_limit(source, port, DEFAULT_MAX_FAN_OUT)
}

/// Patch `source` into `port`, replacing whatever was there.
///
/// Self-loops and longer cycles are accepted; they render as silence at the
/// point of re-entry.
pub fn connect_with_limit(source: &NodeRef, port: &Port, limit: usize) -> Result<()> {
    if let Some(current) = port.source() {
        if Arc::ptr_eq(&current, source) {
            return Ok(());
        }
    }

    let claimed = source
        .fan_out_counter()
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
            (count < limit).then_some(count + 1)
        });
    if claimed.is_err() {
        warn!(source = ?source.kind(), port = port.name(), limit, "fan-out limit reached");
        return Err(Error::FanOutExceeded { limit });
    }

    if let Some(previous) = port.replace(Some(source)) {
        previous.release_fan_out();
    }
    debug!(source = ?source.kind(), port = port.name(), "connected");
    Ok(())
}

/// Unpatch `port`. Returns the node that was connected, if it was alive.
pub fn disconnect(port: &Port) -> Option<NodeRef> {
    let previous = port.replace(None);
    if let Some(node) = &previous {
        node.release_fan_out();
        debug!(source = ?node.kind(), port = port.name(), "disconnected");
    }
    previous
}
