//! Gate and trigger detection on ordinary audio-rate signals.

/*
Gates and Triggers
==================

There is no separate "event" wire in a patch. A gate is just a signal:

    sample >  0.0   high
    sample <= 0.0   low

A rising edge is a low sample followed by a high one. A falling edge is the
reverse.

Carrying State Across Callbacks
-------------------------------

The detector remembers the last sample it saw. That sample comes from the
PREVIOUS callback when a new buffer starts, so an edge that lands on frame 0
is still seen, and an edge that landed on the final frame of the last buffer
is not reported a second time:

    callback K:    ... -0.2  -0.1  [0.8]      rising edge at K's last frame
    callback K+1:  [0.8]  0.8   0.7 ...       still high, nothing reported

Never reset `last` to a constant between callbacks; that is the classic way
to miss (or double-fire) edges that straddle a buffer boundary.

Pulse vs Gate
-------------

Sequencers and clocks send one-sample impulses; keyboards send held gates.
`triggers` classifies each rising edge by peeking one frame ahead:

    0 0 [1] 0 0 0     Pulse (high for exactly one frame)
    0 0 [1] 1 1 1     Gate  (still high on the next frame)

An edge on the final frame cannot be classified yet and is reported as a
Gate.

Audio-Rate vs Block-Rate
------------------------

`scan`/`triggers` look at every frame (audio-rate). `step_block` looks only
at frame 0 (block-rate): cheap, but a pulse that lands anywhere except the
first frame is invisible to it. Nodes document which one they use.
*/

/// Direction of a gate transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Shape of the high run that follows a rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// High for exactly one frame.
    Pulse,
    /// High for more than one frame, or unknown because the edge was on the last frame.
    Gate,
}

/// A rising edge located inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub frame: usize,
    pub kind: TriggerKind,
}

#[inline]
fn is_high(sample: f32) -> bool {
    sample > 0.0
}

/// Rising/falling edge detector with one retained sample of history.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDetector {
    last: f32,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { last: 0.0 }
    }

    /// Advance by one sample.
    #[inline]
    pub fn step(&mut self, sample: f32) -> Option<Edge> {
        let was_high = is_high(self.last);
        let high = is_high(sample);
        self.last = sample;

        match (was_high, high) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        }
    }

    /// Scan channel 0 of every frame, reporting each edge with its frame index.
    pub fn scan(&mut self, buffer: &[f32], channels: usize, mut on_edge: impl FnMut(usize, Edge)) {
        let channels = channels.max(1);
        for (frame, chunk) in buffer.chunks(channels).enumerate() {
            if let Some(edge) = self.step(chunk[0]) {
                on_edge(frame, edge);
            }
        }
    }

    /// Scan for rising edges and classify each as a pulse or a gate.
    pub fn triggers(
        &mut self,
        buffer: &[f32],
        channels: usize,
        mut on_trigger: impl FnMut(Trigger),
    ) {
        let channels = channels.max(1);
        self.scan(buffer, channels, |frame, edge| {
            if edge != Edge::Rising {
                return;
            }
            on_trigger(Trigger {
                frame,
                kind: classify(buffer, frame, channels),
            });
        });
    }

    /// Index of the first rising edge in the buffer, consuming the whole buffer.
    pub fn first_rising_edge(&mut self, buffer: &[f32], channels: usize) -> Option<usize> {
        let mut first = None;
        self.scan(buffer, channels, |frame, edge| {
            if edge == Edge::Rising && first.is_none() {
                first = Some(frame);
            }
        });
        first
    }

    /// Block-rate variant: only frame 0 of the buffer is inspected.
    pub fn step_block(&mut self, buffer: &[f32]) -> Option<Edge> {
        buffer.first().and_then(|&sample| self.step(sample))
    }

    /// Is the most recently seen sample high?
    pub fn is_high(&self) -> bool {
        is_high(self.last)
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

/// Classify the rising edge at `frame` by peeking at the next frame.
pub fn classify(buffer: &[f32], frame: usize, channels: usize) -> TriggerKind {
    let channels = channels.max(1);
    match buffer.get((frame + 1) * channels) {
        Some(&next) if !is_high(next) => TriggerKind::Pulse,
        _ => TriggerKind::Gate,
    }
}

/// True when exactly one frame of channel 0 is high: a one-shot impulse
/// rather than a held gate.
pub fn is_impulse(buffer: &[f32], channels: usize) -> bool {
    let channels = channels.max(1);
    buffer
        .chunks(channels)
        .filter(|chunk| is_high(chunk[0]))
        .count()
        == 1
}
