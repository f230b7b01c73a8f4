use crate::{
    dsp::{
        kernel::Kernel,
        modulate::Modulation,
        oscillator::{OscParams, Oscillator, Waveform},
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Audio Oscillator
================

The fundamental sound source. Generates a repeating waveform at a frequency
(pitch), producing raw material for filters, envelopes and effects.

Waveform character:

  Sine      pure tone, fundamental only              sub-bass, FM carrier
  Saw       all harmonics, falling as 1/n            leads, basses, pads
  Square    odd harmonics, falling as 1/n            hollow leads, chiptune
  Triangle  odd harmonics, falling as 1/n²           soft leads
  Noise     every frequency equally, no pitch        percussion, texture

Inputs, all read per frame:

  fm     exponential pitch modulation; +1 at depth 1 raises one octave
  amp    multiplies the output level (tremolo, ring modulation)
  sync   a rising edge restarts the cycle (hard sync, retrigger)

Example usage:
  let osc = Node::new(OscillatorNode::saw(48_000.0));
  osc.set_param("frequency", 110.0)?;
  connect(&lfo, osc.input("fm")?)?;
*/

static INPUTS: [PortSpec; 3] = [
    PortSpec::audio("fm"),
    PortSpec::audio("amp"),
    PortSpec::audio("sync"),
];
const FM: usize = 0;
const AMP: usize = 1;
const SYNC: usize = 2;

static PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("frequency", 440.0, 0.0, 20_000.0),
    ParamSpec::new("amplitude", 1.0, 0.0, 1.0),
    ParamSpec::new("fm_depth", 1.0, 0.0, 8.0),
];
const FREQUENCY: usize = 0;
const AMPLITUDE: usize = 1;
const FM_DEPTH: usize = 2;

pub struct OscillatorNode {
    osc: Oscillator,
    waveform: Waveform,
}

impl OscillatorNode {
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            osc: Oscillator::new(sample_rate),
            waveform,
        }
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Sine)
    }

    pub fn saw(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Saw)
    }

    pub fn square(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Square)
    }

    pub fn triangle(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Triangle)
    }

    pub fn noise(sample_rate: f32) -> Self {
        Self::new(sample_rate, Waveform::Noise)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

impl Processor for OscillatorNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Oscillator
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let params = OscParams {
            waveform: self.waveform,
            frequency: io.param(FREQUENCY),
            fm: io.modulation(FM).unwrap_or(Modulation::Block(0.0)),
            fm_depth: io.param(FM_DEPTH),
            amplitude: io.param(AMPLITUDE),
            am: io.modulation(AMP),
            sync: io.input(SYNC),
        };
        self.osc.process(out, ctx.frames, ctx.channels, params);
    }

    fn reset(&mut self) {
        self.osc.reset();
    }
}
