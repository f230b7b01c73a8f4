use crate::dsp::{
    kernel::Kernel,
    modulate::Ramp,
    numeric::{clamp_finite, safe_pow},
    trigger::{Edge, EdgeDetector},
};

/*
Envelope Generators
===================

Two trigger-driven envelope state machines: a two-stage AD (percussive, fire
and forget) and a four-stage ADSR (held notes). Both read their trigger from
an ordinary audio signal, sample by sample, so a one-frame pulse from a clock
or sequencer can land anywhere in the buffer and still fire.

Vocabulary
----------

  counter     Samples elapsed in the current stage. Reset to 0 on every
              stage change.

  length      Stage duration in samples (never below 1).

  curve       Exponent applied to the normalized stage position:
                curve = 1    straight line
                curve > 1    slow start, fast finish
                curve < 1    fast start, slow finish


The AD Shape
------------

    Level
      1.0 ┐      ╱╲
          │     ╱  ╲
          │    ╱    ╲
      0.0 └───╱──────╲────→ samples
             Attack Decay

    Attack:  level = (counter / attack) ^ attack_curve
    Decay:   level = (1 - counter / decay) ^ decay_curve

With attack = A and curve = 1 the attack produces 0 at counter 0, 0.5 at
A/2 and exactly 1.0 at A, which is also the last attack sample. The decay
hits exactly 0.0 at counter = decay and drops to Idle right after.


The State Machine
-----------------

    ┌──────┐  rising edge  ┌────────┐ counter > A ┌───────┐ counter > D ┌──────┐
    │ Idle │ ────────────→ │ Attack │ ──────────→ │ Decay │ ──────────→ │ Idle │
    └──────┘               └────────┘             └───────┘             └──────┘

A rising edge in any stage restarts the attack from counter 0.

ADSR adds a Sustain stage held until the gate FALLS, and a Release stage
that ramps from whatever level the envelope had at that moment (the held
"start level") down to zero:

    Release: level = start_level * (1 - counter / release) ^ curve


Parameter Interpolation
-----------------------

Stage lengths and curves arrive as `Ramp`s: the owning node ramps each one
from last buffer's value to this buffer's value, and the envelope reads the
interpolated value every sample. Turning the attack knob mid-note therefore
bends the curve instead of stepping it.


Numeric Hygiene
---------------

`0 ^ negative` is infinity and `negative ^ fractional` is NaN. Lengths are
clamped to at least one sample, curves to [CURVE_MIN, CURVE_MAX] (NaN falls
back to linear), the power base is clamped to [0, 1], and any non-finite
result becomes 0. A single NaN here would be summed into every downstream
buffer, so these clamps are not optional.
*/

/// Smallest accepted curve exponent.
pub const CURVE_MIN: f32 = 0.1;
/// Largest accepted curve exponent.
pub const CURVE_MAX: f32 = 10.0;
/// Longest stage, in samples (about 10 minutes at 48 kHz).
pub const MAX_STAGE_SAMPLES: f32 = 30_000_000.0;

#[inline]
fn stage_length(samples: f32) -> f32 {
    clamp_finite(samples, 1.0, MAX_STAGE_SAMPLES, 1.0)
}

#[inline]
fn curve(exponent: f32) -> f32 {
    clamp_finite(exponent, CURVE_MIN, CURVE_MAX, 1.0)
}

#[inline]
fn trigger_sample(trigger: Option<&[f32]>, frame: usize, channels: usize) -> f32 {
    trigger
        .and_then(|samples| samples.get(frame * channels))
        .copied()
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdStage {
    Idle,
    Attack,
    Decay,
}

/// Per-call parameters for [`AdEnvelope`]. Lengths are in samples.
#[derive(Debug, Clone, Copy)]
pub struct AdParams<'a> {
    /// Trigger signal, read at audio rate. `None` reads as low.
    pub trigger: Option<&'a [f32]>,
    pub attack: Ramp,
    pub decay: Ramp,
    pub attack_curve: Ramp,
    pub decay_curve: Ramp,
}

/// Two-stage attack/decay generator.
#[derive(Debug, Clone)]
pub struct AdEnvelope {
    stage: AdStage,
    counter: f32,
    level: f32,
    edge: EdgeDetector,
}

impl Default for AdEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl AdEnvelope {
    pub fn new() -> Self {
        Self {
            stage: AdStage::Idle,
            counter: 0.0,
            level: 0.0,
            edge: EdgeDetector::new(),
        }
    }

    /// Start the attack from counter 0.
    pub fn trigger(&mut self) {
        self.stage = AdStage::Attack;
        self.counter = 0.0;
    }

    /// Produce one sample and advance the state machine.
    pub fn next_sample(&mut self, attack: f32, decay: f32, attack_curve: f32, decay_curve: f32) -> f32 {
        match self.stage {
            AdStage::Idle => {
                self.level = 0.0;
            }
            AdStage::Attack => {
                let length = stage_length(attack);
                self.level = safe_pow(self.counter / length, curve(attack_curve));
                self.counter += 1.0;
                if self.counter > length {
                    self.stage = AdStage::Decay;
                    self.counter = 0.0;
                }
            }
            AdStage::Decay => {
                let length = stage_length(decay);
                self.level = safe_pow(1.0 - self.counter / length, curve(decay_curve));
                self.counter += 1.0;
                if self.counter > length {
                    self.stage = AdStage::Idle;
                    self.counter = 0.0;
                }
            }
        }

        self.level
    }

    pub fn stage(&self) -> AdStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != AdStage::Idle
    }
}

impl<'a> Kernel<AdParams<'a>> for AdEnvelope {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: AdParams<'a>) {
        let channels = channels.max(1);
        for (frame, chunk) in buffer.chunks_mut(channels).take(frames).enumerate() {
            let gate = trigger_sample(params.trigger, frame, channels);
            if self.edge.step(gate) == Some(Edge::Rising) {
                self.trigger();
            }

            let value = self.next_sample(
                params.attack.at(frame, frames),
                params.decay.at(frame, frames),
                params.attack_curve.at(frame, frames),
                params.decay_curve.at(frame, frames),
            );
            chunk.fill(value);
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Per-call parameters for [`AdsrEnvelope`]. Lengths are in samples.
#[derive(Debug, Clone, Copy)]
pub struct AdsrParams<'a> {
    /// Gate signal, read at audio rate: rising edge starts, falling edge releases.
    pub gate: Option<&'a [f32]>,
    pub attack: Ramp,
    pub decay: Ramp,
    pub sustain: Ramp,
    pub release: Ramp,
    pub curve: Ramp,
}

/// Four-stage attack/decay/sustain/release generator.
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    stage: AdsrStage,
    counter: f32,
    level: f32,
    attack_start: f32,
    release_start: f32,
    edge: EdgeDetector,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl AdsrEnvelope {
    pub fn new() -> Self {
        Self {
            stage: AdsrStage::Idle,
            counter: 0.0,
            level: 0.0,
            attack_start: 0.0,
            release_start: 0.0,
            edge: EdgeDetector::new(),
        }
    }

    /// Gate high: attack from the current level, so retriggers don't click.
    pub fn note_on(&mut self) {
        self.attack_start = self.level;
        self.stage = AdsrStage::Attack;
        self.counter = 0.0;
    }

    /// Gate low: release from the current level.
    pub fn note_off(&mut self) {
        if self.stage == AdsrStage::Idle {
            return;
        }
        self.release_start = self.level;
        self.stage = AdsrStage::Release;
        self.counter = 0.0;
    }

    pub fn next_sample(&mut self, attack: f32, decay: f32, sustain: f32, release: f32, shape: f32) -> f32 {
        let shape = curve(shape);
        let sustain = clamp_finite(sustain, 0.0, 1.0, 0.0);

        match self.stage {
            AdsrStage::Idle => {
                self.level = 0.0;
            }
            AdsrStage::Attack => {
                let length = stage_length(attack);
                let rise = safe_pow(self.counter / length, shape);
                self.level = self.attack_start + (1.0 - self.attack_start) * rise;
                self.counter += 1.0;
                if self.counter > length {
                    self.stage = AdsrStage::Decay;
                    self.counter = 0.0;
                }
            }
            AdsrStage::Decay => {
                let length = stage_length(decay);
                let fall = safe_pow(1.0 - self.counter / length, shape);
                self.level = sustain + (1.0 - sustain) * fall;
                self.counter += 1.0;
                if self.counter > length {
                    self.stage = AdsrStage::Sustain;
                    self.counter = 0.0;
                }
            }
            AdsrStage::Sustain => {
                self.level = sustain;
            }
            AdsrStage::Release => {
                let length = stage_length(release);
                self.level = self.release_start * safe_pow(1.0 - self.counter / length, shape);
                self.counter += 1.0;
                if self.counter > length {
                    self.stage = AdsrStage::Idle;
                    self.counter = 0.0;
                    self.level = 0.0;
                }
            }
        }

        self.level
    }

    pub fn stage(&self) -> AdsrStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != AdsrStage::Idle
    }
}

impl<'a> Kernel<AdsrParams<'a>> for AdsrEnvelope {
    fn process(&mut self, buffer: &mut [f32], frames: usize, channels: usize, params: AdsrParams<'a>) {
        let channels = channels.max(1);
        for (frame, chunk) in buffer.chunks_mut(channels).take(frames).enumerate() {
            match self.edge.step(trigger_sample(params.gate, frame, channels)) {
                Some(Edge::Rising) => self.note_on(),
                Some(Edge::Falling) => self.note_off(),
                None => {}
            }

            let value = self.next_sample(
                params.attack.at(frame, frames),
                params.decay.at(frame, frames),
                params.sustain.at(frame, frames),
                params.release.at(frame, frames),
                params.curve.at(frame, frames),
            );
            chunk.fill(value);
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
