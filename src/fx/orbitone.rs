//! Orbitone: ensemble effect with counter-rotating taps.
//!
//! Each side writes into its own 16-bit line and reads it back through two
//! taps driven by LFOs in quadrature. The right side uses the negated LFOs,
//! so the two channels orbit around the centre delay in opposite directions.

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, LfoIndex, Reserve, Segment};
use crate::dsp::codec::Fixed16;
use crate::dsp::lfo::Lfo;
use crate::dsp::mix::blend_dry_wet;
use crate::error::Result;
use std::f32::consts::FRAC_PI_2;

const CAPACITY: usize = 4096;
const LAYOUT: [Reserve; 2] = [Reserve::new("left", 2047), Reserve::new("right", 2047)];

const CENTER: f32 = 1024.0;
const MAX_EXCURSION: f32 = 512.0;
const MAX_RATE_HZ: f32 = 1.0;
const MIX: f32 = 0.5;

pub struct Orbitone {
    arena: DelayArena<Fixed16>,
    left: Segment,
    right: Segment,
    rate: f32,
    depth: f32,
}

impl Orbitone {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let layout = ArenaLayout::new(CAPACITY, &LAYOUT)?;
        let left = layout.segment(0);
        let right = layout.segment(1);
        let arena = DelayArena::new(layout).with_lfos(
            Lfo::new(sample_rate, 0.0, MAX_RATE_HZ),
            Lfo::new(sample_rate, 0.0, MAX_RATE_HZ).with_phase(FRAC_PI_2),
        );

        let mut orbitone = Self {
            arena,
            left,
            right,
            rate: 0.0,
            depth: 0.0,
        };
        orbitone.set_rate(0.4);
        orbitone.set_depth(0.5);
        Ok(orbitone)
    }

    /// Normalized rate in [0, 1], mapped onto 0 - 1 Hz.
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

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }
}

impl Effect for Orbitone {
    fn name(&self) -> &'static str {
        "orbitone"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let (left, right) = (self.left, self.right);
        let a = MAX_EXCURSION * self.depth;
        let mut c = self.arena.start();

        c.load(in_l);
        c.write(left, 0, 0.0);
        c.load(in_r);
        c.write(right, 0, 0.0);

        c.interpolate_lfo(left, CENTER, LfoIndex::Lfo1, a, 0.5);
        c.interpolate_lfo(left, CENTER, LfoIndex::Lfo2, a, 0.5);
        let wet_l = c.store(0.0);

        c.interpolate_lfo(right, CENTER, LfoIndex::Lfo1, -a, 0.5);
        c.interpolate_lfo(right, CENTER, LfoIndex::Lfo2, -a, 0.5);
        let wet_r = c.store(0.0);

        (
            blend_dry_wet(in_l, wet_l, MIX),
            blend_dry_wet(in_r, wet_r, MIX),
        )
    }

    fn reset(&mut self) {
        self.arena.reset();
    }
}
