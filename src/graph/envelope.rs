use crate::{
    dsp::{
        envelope::{AdEnvelope, AdParams, AdsrEnvelope, AdsrParams},
        kernel::Kernel,
        modulate::Smoothed,
    },
    graph::{
        node::{AudioContext, NodeIo, NodeKind, Processor},
        param::ParamSpec,
        port::PortSpec,
    },
};

/*
Envelope Nodes
==============

Graph wrappers around the AD and ADSR state machines in `dsp::envelope`.

The trigger/gate input is read at AUDIO rate: a one-sample pulse from a
clock or sequencer can land on any frame and still fire. The stage-length
inputs are read at BLOCK rate and added to the knob values (in seconds).

Every time-like value is smoothed: the kernel receives a ramp from the
previous buffer's value to this buffer's, so a knob turned mid-note bends
the curve instead of stepping it.

Output is the envelope level in [0, 1] on every channel. Patch it into an
amplifier's `cv` to shape a sound, or into any modulation input.
*/

static AD_INPUTS: [PortSpec; 3] = [
    PortSpec::audio("trigger"),
    PortSpec::block("attack"),
    PortSpec::block("decay"),
];
const AD_TRIGGER: usize = 0;
const AD_ATTACK_CV: usize = 1;
const AD_DECAY_CV: usize = 2;

static AD_PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("attack", 0.01, 0.0, 60.0),
    ParamSpec::new("decay", 0.3, 0.0, 60.0),
    ParamSpec::new("attack_curve", 1.0, 0.1, 10.0),
    ParamSpec::new("decay_curve", 1.0, 0.1, 10.0),
];
const ATTACK: usize = 0;
const DECAY: usize = 1;
const ATTACK_CURVE: usize = 2;
const DECAY_CURVE: usize = 3;

/// Knob value plus an optional block-rate offset, in seconds, as samples.
fn seconds_to_samples(io: &NodeIo<'_>, param: usize, cv: usize, sample_rate: f32) -> f32 {
    let seconds = io.param(param) + io.block(cv).unwrap_or(0.0);
    seconds.max(0.0) * sample_rate
}

/// Two-stage percussive envelope.
pub struct AdEnvelopeNode {
    sample_rate: f32,
    env: AdEnvelope,
    attack: Smoothed,
    decay: Smoothed,
    attack_curve: Smoothed,
    decay_curve: Smoothed,
}

impl AdEnvelopeNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            env: AdEnvelope::new(),
            attack: Smoothed::new(),
            decay: Smoothed::new(),
            attack_curve: Smoothed::new(),
            decay_curve: Smoothed::new(),
        }
    }
}

impl Processor for AdEnvelopeNode {
    fn kind(&self) -> NodeKind {
        NodeKind::AdEnvelope
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &AD_INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &AD_PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let attack = seconds_to_samples(io, ATTACK, AD_ATTACK_CV, self.sample_rate);
        let decay = seconds_to_samples(io, DECAY, AD_DECAY_CV, self.sample_rate);

        let params = AdParams {
            trigger: io.input(AD_TRIGGER),
            attack: self.attack.ramp_to(attack),
            decay: self.decay.ramp_to(decay),
            attack_curve: self.attack_curve.ramp_to(io.param(ATTACK_CURVE)),
            decay_curve: self.decay_curve.ramp_to(io.param(DECAY_CURVE)),
        };
        self.env.process(out, ctx.frames, ctx.channels, params);
    }

    fn reset(&mut self) {
        self.env.reset();
        self.attack.reset();
        self.decay.reset();
        self.attack_curve.reset();
        self.decay_curve.reset();
    }
}

static ADSR_INPUTS: [PortSpec; 1] = [PortSpec::audio("gate")];
const ADSR_GATE: usize = 0;

static ADSR_PARAMS: [ParamSpec; 5] = [
    ParamSpec::new("attack", 0.01, 0.0, 60.0),
    ParamSpec::new("decay", 0.1, 0.0, 60.0),
    ParamSpec::new("sustain", 0.7, 0.0, 1.0),
    ParamSpec::new("release", 0.3, 0.0, 60.0),
    ParamSpec::new("curve", 1.0, 0.1, 10.0),
];
const ADSR_ATTACK: usize = 0;
const ADSR_DECAY: usize = 1;
const ADSR_SUSTAIN: usize = 2;
const ADSR_RELEASE: usize = 3;
const ADSR_CURVE: usize = 4;

/// Four-stage envelope for held notes: rising gate attacks, falling gate releases.
pub struct AdsrEnvelopeNode {
    sample_rate: f32,
    env: AdsrEnvelope,
    attack: Smoothed,
    decay: Smoothed,
    sustain: Smoothed,
    release: Smoothed,
    curve: Smoothed,
}

impl AdsrEnvelopeNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            env: AdsrEnvelope::new(),
            attack: Smoothed::new(),
            decay: Smoothed::new(),
            sustain: Smoothed::new(),
            release: Smoothed::new(),
            curve: Smoothed::new(),
        }
    }
}

impl Processor for AdsrEnvelopeNode {
    fn kind(&self) -> NodeKind {
        NodeKind::AdsrEnvelope
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &ADSR_INPUTS
    }

    fn params(&self) -> &'static [ParamSpec] {
        &ADSR_PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], ctx: &AudioContext) {
        let sr = self.sample_rate;
        let params = AdsrParams {
            gate: io.input(ADSR_GATE),
            attack: self.attack.ramp_to(io.param(ADSR_ATTACK) * sr),
            decay: self.decay.ramp_to(io.param(ADSR_DECAY) * sr),
            sustain: self.sustain.ramp_to(io.param(ADSR_SUSTAIN)),
            release: self.release.ramp_to(io.param(ADSR_RELEASE) * sr),
            curve: self.curve.ramp_to(io.param(ADSR_CURVE)),
        };
        self.env.process(out, ctx.frames, ctx.channels, params);
    }

    fn reset(&mut self) {
        self.env.reset();
        self.attack.reset();
        self.decay.reset();
        self.sustain.reset();
        self.release.reset();
        self.curve.reset();
    }
}
