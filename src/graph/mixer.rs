use crate::{
    dsp::{
        mix::{scale_in_place, sum_scaled_into},
        modulate::Smoothed,
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/// Number of inputs on a mixer.
pub const MIXER_INPUTS: usize = 4;

static INPUTS: [PortSpec; MIXER_INPUTS] = [
    PortSpec::audio("in1"),
    PortSpec::audio("in2"),
    PortSpec::audio("in3"),
    PortSpec::audio("in4"),
];

static PARAMS: [ParamSpec; MIXER_INPUTS + 1] = [
    ParamSpec::new("gain1", 1.0, 0.0, 2.0),
    ParamSpec::new("gain2", 1.0, 0.0, 2.0),
    ParamSpec::new("gain3", 1.0, 0.0, 2.0),
    ParamSpec::new("gain4", 1.0, 0.0, 2.0),
    ParamSpec::new("master", 1.0, 0.0, 2.0),
];
const MASTER: usize = MIXER_INPUTS;

/// Four-channel summing mixer with ramped per-input gains.
///
/// The sum is not limited; clipping is the output stage's job.
pub struct MixerNode {
    gains: [Smoothed; MIXER_INPUTS],
    master: Smoothed,
}

impl MixerNode {
    pub fn new() -> Self {
        Self {
            gains: [Smoothed::new(); MIXER_INPUTS],
            master: Smoothed::new(),
        }
    }
}

impl Default for MixerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for MixerNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Mixer
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        for (index, gain) in self.gains.iter_mut().enumerate() {
            // Ramp even when unpatched so a later patch starts from the knob.
            let ramp = gain.ramp_to(io.param(index));
            if let Some(input) = io.input(index) {
                sum_scaled_into(out, input, ctx.channels, ramp);
            }
        }
        let master = self.master.ramp_to(io.param(MASTER));
        scale_in_place(out, ctx.channels, master);
    }

    fn reset(&mut self) {
        for gain in &mut self.gains {
            gain.reset();
        }
        self.master.reset();
    }
}
