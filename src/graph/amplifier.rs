use crate::{
    dsp::{
        mix::{multiply_in_place, scale_in_place},
        modulate::Smoothed,
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Voltage-Controlled Amplifier
============================

    output = in × cv × gain

`cv` is read per frame. An envelope patched into `cv` shapes the note; an
audio-rate oscillator there becomes ring modulation. With `cv` unpatched
the node is a plain gain stage.
*/

static INPUTS: [PortSpec; 2] = [PortSpec::audio("in"), PortSpec::audio("cv")];
const IN: usize = 0;
const CV: usize = 1;

static PARAMS: [ParamSpec; 1] = [ParamSpec::new("gain", 1.0, 0.0, 4.0)];
const GAIN: usize = 0;

pub struct AmplifierNode {
    gain: Smoothed,
}

impl AmplifierNode {
    pub fn new() -> Self {
        Self {
            gain: Smoothed::new(),
        }
    }
}

impl Default for AmplifierNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for AmplifierNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Amplifier
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let gain = self.gain.ramp_to(io.param(GAIN));
        let Some(input) = io.input(IN) else {
            return;
        };
        out.copy_from_slice(input);
        if let Some(cv) = io.modulation(CV) {
            multiply_in_place(out, ctx.channels, cv);
        }
        scale_in_place(out, ctx.channels, gain);
    }

    fn reset(&mut self) {
        self.gain.reset();
    }
}
