use crate::{
    dsp::{
        kernel::Kernel,
        reverb::{Reverb, ReverbParams},
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/// Schroeder room reverb. `mix` input is block rate, added to the knob.
///
/// One reverb network is allocated per configured channel; any channel
/// beyond that passes through dry.
pub struct ReverbNode {
    reverb: Reverb,
}

static INPUTS: [PortSpec; 2] = [PortSpec::audio("in"), PortSpec::block("mix")];
const IN: usize = 0;
const MIX_CV: usize = 1;

static PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("room", 0.5, 0.0, 1.0),
    ParamSpec::new("damping", 0.5, 0.0, 1.0),
    ParamSpec::new("mix", 0.3, 0.0, 1.0),
];
const ROOM: usize = 0;
const DAMPING: usize = 1;
const MIX: usize = 2;

impl ReverbNode {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            reverb: Reverb::new(sample_rate, channels),
        }
    }
}

impl Processor for ReverbNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Reverb
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        if let Some(input) = io.input(IN) {
            out.copy_from_slice(input);
        }
        // Keep running unpatched so the tail decays naturally.
        let params = ReverbParams {
            room: io.param(ROOM),
            damping: io.param(DAMPING),
            mix: io.param(MIX) + io.block(MIX_CV).unwrap_or(0.0),
        };
        self.reverb.process(out, ctx.frames, ctx.channels, params);
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
