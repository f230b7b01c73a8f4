use crate::{
    dsp::{
        numeric::clamp_finite,
        trigger::{Edge, EdgeDetector},
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Pulse Generator
===============

Turns gates into one-sample impulses:

    gate:   0 0 1 1 1 1 0 0 1 1
    out:    0 0 1 0 0 0 0 0 1 0

With nothing patched into `gate` it runs as a clock, emitting one impulse
every 1 / rate seconds, starting on the very first frame.

The gate is read at audio rate so an edge anywhere in the buffer fires on
that exact frame.
*/

static INPUTS: [PortSpec; 1] = [PortSpec::audio("gate")];
const GATE: usize = 0;

static PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("rate", 2.0, 0.0, 1_000.0),
    ParamSpec::new("level", 1.0, 0.0, 1.0),
];
const RATE: usize = 0;
const LEVEL: usize = 1;

pub struct PulseNode {
    sample_rate: f32,
    edge: EdgeDetector,
    phase: f32,
}

impl PulseNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            edge: EdgeDetector::new(),
            phase: 1.0,
        }
    }
}

impl Processor for PulseNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Pulse
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let channels = ctx.channels.max(1);
        let level = io.param(LEVEL);

        match io.input(GATE) {
            Some(gate) => {
                self.edge.scan(gate, channels, |frame, edge| {
                    if edge == Edge::Rising {
                        if let Some(chunk) = out.chunks_mut(channels).nth(frame) {
                            chunk.fill(level);
                        }
                    }
                });
            }
            None => {
                let increment = clamp_finite(io.param(RATE), 0.0, self.sample_rate * 0.5, 0.0)
                    / self.sample_rate;
                for chunk in out.chunks_mut(channels).take(ctx.frames) {
                    if self.phase >= 1.0 && increment > 0.0 {
                        self.phase -= self.phase.floor();
                        chunk.fill(level);
                    }
                    self.phase += increment;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.edge.reset();
        self.phase = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        node::{Node, NodeRef},
        port::connect,
    };

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

    fn render(node: &NodeRef, frames: usize, timestamp: u64) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        node.render(&mut out, &AudioContext::new(1_000.0, frames, 1, timestamp));
        out
    }

    #[test]
    fn gate_becomes_impulses() {
        let pulse = Node::new(PulseNode::new(1_000.0));
        let gate = Node::new(Fixed(vec![0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0]));
        connect(&gate, pulse.input("gate").unwrap()).unwrap();

        assert_eq!(
            render(&pulse, 8, 1),
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn free_running_clock() {
        let pulse = Node::new(PulseNode::new(1_000.0));
        pulse.set_param("rate", 250.0).unwrap();

        let out = render(&pulse, 8, 1);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);

        // The period carries across buffers.
        let out = render(&pulse, 4, 2);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_rate_is_silent() {
        let pulse = Node::new(PulseNode::new(1_000.0));
        pulse.set_param("rate", 0.0).unwrap();
        assert!(render(&pulse, 16, 1).iter().all(|&s| s == 0.0));
    }
}
