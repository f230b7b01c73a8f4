use crate::{
    dsp::{
        delay::{DelayLine, DelayParams},
        kernel::Kernel,
        modulate::Modulation,
    },
    graph::{
        buffer::ScratchBuffer,
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Delay Node
==========

    in ──→ [ delay line ] ──→ out
              ↑      │
              └─ fb ─┘

Inputs and their rates:

  in        audio   signal to delay
  time      audio   seconds added to the `time` knob, per frame; the whole
                    buffer goes to the kernel (chorus, flanger, wobble)
  feedback  block   added to the `feedback` knob
  mix       block   added to the `mix` knob

The delay line is allocated once, sized for `MAX_DELAY_SECONDS`.
*/

/// Longest delay the node can be set to.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

static INPUTS: [PortSpec; 4] = [
    PortSpec::audio("in"),
    PortSpec::audio("time"),
    PortSpec::block("feedback"),
    PortSpec::block("mix"),
];
const IN: usize = 0;
const TIME_CV: usize = 1;
const FEEDBACK_CV: usize = 2;
const MIX_CV: usize = 3;

static PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("time", 0.25, 0.0, MAX_DELAY_SECONDS),
    ParamSpec::new("feedback", 0.4, 0.0, 0.99),
    ParamSpec::new("mix", 0.5, 0.0, 1.0),
];
const TIME: usize = 0;
const FEEDBACK: usize = 1;
const MIX: usize = 2;

pub struct DelayNode {
    line: DelayLine,
    times: ScratchBuffer,
}

impl DelayNode {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            line: DelayLine::new(sample_rate, MAX_DELAY_SECONDS, channels),
            times: ScratchBuffer::with_capacity(crate::MAX_BLOCK_SIZE),
        }
    }
}

impl Processor for DelayNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Delay
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        // Unpatched input still lets the tail ring out.
        if let Some(input) = io.input(IN) {
            out.copy_from_slice(input);
        }
        self.run(io, out, ctx);
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}

impl DelayNode {
    fn run(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let base = io.param(TIME);
        let time = match io.modulation(TIME_CV) {
            Some(cv) => {
                self.times.resize(ctx.frames);
                for (frame, time) in self.times.as_mut_slice().iter_mut().enumerate() {
                    *time = base + cv.at(frame);
                }
                Modulation::Audio {
                    samples: self.times.as_slice(),
                    channels: 1,
                }
            }
            None => Modulation::Block(base),
        };

        let params = DelayParams {
            time,
            feedback: io.param(FEEDBACK) + io.block(FEEDBACK_CV).unwrap_or(0.0),
            mix: io.param(MIX) + io.block(MIX_CV).unwrap_or(0.0),
        };
        self.line.process(out, ctx.frames, ctx.channels, params);
    }
}
