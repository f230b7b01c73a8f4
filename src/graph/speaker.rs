use crate::{
    dsp::{mix::scale_in_place, modulate::Smoothed},
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/// An output endpoint. Register it with the engine to hear it.
///
/// Renders its input scaled by a ramped `volume`.
pub struct SpeakerNode {
    volume: Smoothed,
}

static INPUTS: [PortSpec; 1] = [PortSpec::audio("in")];
const IN: usize = 0;

static PARAMS: [ParamSpec; 1] = [ParamSpec::new("volume", 1.0, 0.0, 1.0)];
const VOLUME: usize = 0;

impl SpeakerNode {
    pub fn new() -> Self {
        Self {
            volume: Smoothed::new(),
        }
    }
}

impl Default for SpeakerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for SpeakerNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Speaker
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let volume = self.volume.ramp_to(io.param(VOLUME));
        if let Some(input) = io.input(IN) {
            out.copy_from_slice(input);
            scale_in_place(out, ctx.channels, volume);
        }
    }

    fn reset(&mut self) {
        self.volume.reset();
    }
}
