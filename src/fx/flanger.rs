//! Stereo flanger: short modulated delay with feedback.
//!
//! Each side owns a delay line in a float arena. The tap sweeps around
//! [`CENTER`] samples by up to [`MAX_EXCURSION`]; LFO 2 (right side) runs a
//! quarter cycle behind LFO 1. Part of the tapped signal is fed back into the
//! line, which sharpens the comb notches.
//!
//! ```text
//!   x ──(+)──▶ [ line ] ──tap(lfo)──┬──▶ wet
//!        ▲                          │
//!        └──────── × feedback ◀─────┘
//!
//!   out = ½ (x + wet)
//! ```

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, LfoIndex, Reserve, Segment};
use crate::dsp::codec::Float32;
use crate::dsp::lfo::Lfo;
use crate::error::Result;
use std::f32::consts::FRAC_PI_2;

const CAPACITY: usize = 1024;
const LAYOUT: [Reserve; 2] = [Reserve::new("left", 511), Reserve::new("right", 511)];

pub const CENTER: f32 = 128.0;
pub const MAX_EXCURSION: f32 = 120.0;
pub const MAX_FEEDBACK: f32 = 0.97;

const MIN_RATE_HZ: f32 = 0.1;
const MAX_RATE_HZ: f32 = 5.0;

pub struct Flanger {
    arena: DelayArena<Float32>,
    left: Segment,
    right: Segment,
    rate: f32,
    depth: f32,
    feedback: f32,
    feedback_samples: (f32, f32),
}

impl Flanger {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let layout = ArenaLayout::new(CAPACITY, &LAYOUT)?;
        let left = layout.segment(0);
        let right = layout.segment(1);
        let arena = DelayArena::new(layout).with_lfos(
            Lfo::new(sample_rate, MIN_RATE_HZ, MAX_RATE_HZ),
            Lfo::new(sample_rate, MIN_RATE_HZ, MAX_RATE_HZ).with_phase(FRAC_PI_2),
        );

        let mut flanger = Self {
            arena,
            left,
            right,
            rate: 0.0,
            depth: 0.0,
            feedback: 0.0,
            feedback_samples: (0.0, 0.0),
        };
        flanger.set_rate(0.03);
        flanger.set_depth(0.75);
        flanger.set_feedback(0.5);
        Ok(flanger)
    }

    /// Normalized rate in [0, 1], mapped onto 0.1 - 5 Hz.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(0.0, 1.0);
        self.arena
            .set_lfo_normalized_frequency(LfoIndex::Lfo1, self.rate);
        self.arena
            .set_lfo_normalized_frequency(LfoIndex::Lfo2, self.rate);
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Sweep depth in [0, 1].
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Feedback in [0, 0.97].
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }
}

impl Effect for Flanger {
    fn name(&self) -> &'static str {
        "flanger"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let (left, right) = (self.left, self.right);
        let excursion = MAX_EXCURSION * self.depth;
        let (fb_l, fb_r) = self.feedback_samples;
        let mut c = self.arena.start();

        c.load(in_l);
        c.add(fb_l, self.feedback);
        c.write(left, 0, 0.0);
        c.interpolate_lfo(left, CENTER, LfoIndex::Lfo1, excursion, 1.0);
        let wet_l = c.store(0.0);

        c.load(in_r);
        c.add(fb_r, self.feedback);
        c.write(right, 0, 0.0);
        c.interpolate_lfo(right, CENTER, LfoIndex::Lfo2, excursion, 1.0);
        let wet_r = c.store(0.0);

        self.feedback_samples = (wet_l, wet_r);
        (0.5 * (in_l + wet_l), 0.5 * (in_r + wet_r))
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.feedback_samples = (0.0, 0.0);
    }
}
