use crate::{
    dsp::{
        mix::{crossfade_in_place, scale_in_place},
        modulate::{Ramp, Smoothed},
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Crossfader
==========

    output = a × (1 − position) + b × position

`position` is the knob plus the `position` input, read at BLOCK rate: a
fader is moved by hand, and one value per buffer is plenty. The value is
ramped from the previous buffer's position across this buffer, so a fast
throw does not click.
*/

static INPUTS: [PortSpec; 3] = [
    PortSpec::audio("a"),
    PortSpec::audio("b"),
    PortSpec::block("position"),
];
const A: usize = 0;
const B: usize = 1;
const POSITION_CV: usize = 2;

static PARAMS: [ParamSpec; 1] = [ParamSpec::new("position", 0.5, 0.0, 1.0)];
const POSITION: usize = 0;

pub struct CrossfaderNode {
    position: Smoothed,
}

impl CrossfaderNode {
    pub fn new() -> Self {
        Self {
            position: Smoothed::new(),
        }
    }
}

impl Default for CrossfaderNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for CrossfaderNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Crossfader
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let target = (io.param(POSITION) + io.block(POSITION_CV).unwrap_or(0.0)).clamp(0.0, 1.0);
        let position = self.position.ramp_to(target);

        if let Some(a) = io.input(A) {
            out.copy_from_slice(a);
        }
        match io.input(B) {
            Some(b) => crossfade_in_place(out, b, ctx.channels, position),
            None => scale_in_place(
                out,
                ctx.channels,
                Ramp::new(1.0 - position.from, 1.0 - position.to),
            ),
        }
    }

    fn reset(&mut self) {
        self.position.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        control::ControlNode,
        node::{Node, NodeRef},
        port::connect,
    };

    fn dial(value: f32) -> NodeRef {
        let node = Node::new(ControlNode::new());
        node.set_param("value", value).unwrap();
        node
    }

    #[test]
    fn blends_by_position() {
        let (a, b) = (dial(1.0), dial(0.0));
        let fader = Node::new(CrossfaderNode::new());
        fader.set_param("position", 0.25).unwrap();
        connect(&a, fader.input("a").unwrap()).unwrap();
        connect(&b, fader.input("b").unwrap()).unwrap();

        let mut out = vec![0.0; 4];
        fader.render(&mut out, &AudioContext::new(48_000.0, 2, 2, 1));
        assert_eq!(out, vec![0.75; 4]);
    }

    #[test]
    fn position_input_is_block_rate_and_ramped() {
        let (a, b) = (dial(0.0), dial(1.0));
        let cv = dial(0.0);
        let fader = Node::new(CrossfaderNode::new());
        fader.set_param("position", 0.0).unwrap();
        connect(&a, fader.input("a").unwrap()).unwrap();
        connect(&b, fader.input("b").unwrap()).unwrap();
        connect(&cv, fader.input("position").unwrap()).unwrap();

        let mut out = vec![0.0; 4];
        fader.render(&mut out, &AudioContext::new(48_000.0, 4, 1, 1));
        assert_eq!(out, vec![0.0; 4]);

        cv.set_param("value", 1.0).unwrap();
        fader.render(&mut out, &AudioContext::new(48_000.0, 4, 1, 2));
        assert_eq!(out, vec![0.25, 0.5, 0.75, 1.0]);
    }
}
