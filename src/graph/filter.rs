use crate::{
    dsp::{
        filter::{FilterMode, FilterParams, SVFilter},
        kernel::Kernel,
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Filter Node
===========

| mode | response  |
| ---- | --------- |
| 0    | low-pass  |
| 1    | high-pass |
| 2    | band-pass |
| 3    | notch     |

The `cutoff` input is BLOCK rate: coefficients are computed once per buffer.
It sweeps exponentially, `cutoff_depth` octaves per unit:

    cutoff_hz = cutoff × 2 ^ (cv × cutoff_depth)

An envelope at depth 4 opens a 200 Hz filter up to 3.2 kHz.
*/

static INPUTS: [PortSpec; 2] = [PortSpec::audio("in"), PortSpec::block("cutoff")];
const IN: usize = 0;
const CUTOFF_CV: usize = 1;

static PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("mode", 0.0, 0.0, 3.0),
    ParamSpec::new("cutoff", 1_000.0, 20.0, 20_000.0),
    ParamSpec::new("resonance", 0.2, 0.0, 0.98),
    ParamSpec::new("cutoff_depth", 2.0, 0.0, 8.0),
];
const MODE: usize = 0;
const CUTOFF: usize = 1;
const RESONANCE: usize = 2;
const CUTOFF_DEPTH: usize = 3;

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            filter: SVFilter::new(sample_rate),
        }
    }
}

impl Processor for FilterNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Filter
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let Some(input) = io.input(IN) else {
            return;
        };
        out.copy_from_slice(input);

        let octaves = io.block(CUTOFF_CV).unwrap_or(0.0) * io.param(CUTOFF_DEPTH);
        let params = FilterParams {
            mode: FilterMode::from_index(io.param(MODE)),
            cutoff_hz: io.param(CUTOFF) * 2.0_f32.powf(octaves),
            resonance: io.param(RESONANCE),
        };
        self.filter.process(out, ctx.frames, ctx.channels, params);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
