//! Phaser: a chain of first-order all-pass stages swept by an LFO.

/*
Phaser
======

A first-order all-pass passes every frequency at unit gain but delays the
phase by an amount that depends on frequency. Mixing its output with the dry
signal cancels wherever the shift reaches 180°, carving notches. N stages
give N/2 notches; sweeping the break frequency moves them.

One stage, break frequency f:

    t = tan(π·f / fs)
    a = (t - 1) / (t + 1)

    y[n] = a·x[n] + z
    z    = x[n] - a·y[n]

The break frequency follows the LFO between MIN_HZ and MIN_HZ + depth·span.
The right channel uses the inverted LFO. Feedback returns part of the chain
output to its input, which deepens the notches.

    out = ½ (dry + wet)
*/

use super::Effect;
use crate::dsp::lfo::{bipolar_to_unipolar, Lfo};
use std::f32::consts::PI;

pub const MIN_STAGES: usize = 2;
pub const MAX_STAGES: usize = 24;
pub const MAX_FEEDBACK: f32 = 0.97;

const MIN_RATE_HZ: f32 = 0.01;
const MAX_RATE_HZ: f32 = 5.0;

const MIN_HZ: f32 = 200.0;
const SWEEP_HZ: f32 = 3800.0;

#[derive(Clone, Copy, Default)]
struct AllPassStage {
    z: f32,
}

impl AllPassStage {
    #[inline]
    fn process(&mut self, x: f32, a: f32) -> f32 {
        let y = a * x + self.z;
        self.z = x - a * y;
        y
    }
}

pub struct Phaser {
    sample_rate: f32,
    lfo: Lfo,
    stages_l: [AllPassStage; MAX_STAGES],
    stages_r: [AllPassStage; MAX_STAGES],
    nb_stages: usize,
    rate: f32,
    depth: f32,
    feedback: f32,
    last: (f32, f32),
}

impl Phaser {
    pub fn new(sample_rate: f32) -> Self {
        let mut phaser = Self {
            sample_rate,
            lfo: Lfo::new(sample_rate, MIN_RATE_HZ, MAX_RATE_HZ),
            stages_l: [AllPassStage::default(); MAX_STAGES],
            stages_r: [AllPassStage::default(); MAX_STAGES],
            nb_stages: 12,
            rate: 0.0,
            depth: 1.0,
            feedback: 0.0,
            last: (0.0, 0.0),
        };
        phaser.set_rate(0.05);
        phaser.set_feedback(0.5);
        phaser
    }

    /// Normalized rate in [0, 1].
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(0.0, 1.0);
        self.lfo.set_normalized_frequency(self.rate);
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Number of active stages, clamped to 2..=24.
    pub fn set_nb_stages(&mut self, nb_stages: usize) {
        let nb_stages = nb_stages.clamp(MIN_STAGES, MAX_STAGES);
        if nb_stages > self.nb_stages {
            // Newly enabled stages start from rest.
            for stage in &mut self.stages_l[self.nb_stages..nb_stages] {
                *stage = AllPassStage::default();
            }
            for stage in &mut self.stages_r[self.nb_stages..nb_stages] {
                *stage = AllPassStage::default();
            }
        }
        self.nb_stages = nb_stages;
    }

    pub fn nb_stages(&self) -> usize {
        self.nb_stages
    }

    #[inline]
    fn coefficient(&self, sweep: f32) -> f32 {
        let f = (MIN_HZ + self.depth * SWEEP_HZ * sweep).min(0.45 * self.sample_rate);
        let t = (PI * f / self.sample_rate).tan();
        (t - 1.0) / (t + 1.0)
    }
}

impl Effect for Phaser {
    fn name(&self) -> &'static str {
        "phaser"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let lfo = self.lfo.process();
        let a_l = self.coefficient(bipolar_to_unipolar(lfo));
        let a_r = self.coefficient(bipolar_to_unipolar(-lfo));

        let n = self.nb_stages;
        let mut wet_l = in_l + self.feedback * self.last.0;
        for stage in &mut self.stages_l[..n] {
            wet_l = stage.process(wet_l, a_l);
        }
        let mut wet_r = in_r + self.feedback * self.last.1;
        for stage in &mut self.stages_r[..n] {
            wet_r = stage.process(wet_r, a_r);
        }

        // Keep the loop finite if a NaN ever reaches the input.
        self.last = (
            if wet_l.is_finite() { wet_l } else { 0.0 },
            if wet_r.is_finite() { wet_r } else { 0.0 },
        );
        (0.5 * (in_l + wet_l), 0.5 * (in_r + wet_r))
    }

    fn reset(&mut self) {
        self.stages_l = [AllPassStage::default(); MAX_STAGES];
        self.stages_r = [AllPassStage::default(); MAX_STAGES];
        self.last = (0.0, 0.0);
        self.lfo.reset();
    }
}
