//! Four-tap stereo chorus on 16-bit delay memory.

/*
Chorus
======

The mono sum of the input is written into one delay line. Four modulated
taps read it back, two per side:

    wet_L = ½·line[C + A·lfo1] + ½·line[C + A·lfo2]
    wet_R = ½·line[C - A·lfo1] + ½·line[C - A·lfo2]

C is the centre delay (1024 samples, ~21 ms at 48 kHz) and A the excursion
(up to 384 samples at full depth). The right side reads with the opposite
sign, so when the left taps speed up the right taps slow down, which is
where the width comes from. LFO 2 runs a little faster than LFO 1 and starts
a quarter cycle later, so the two taps on a side never move in lockstep.

Output is an even dry/wet blend.

Parameters
----------

  rate    [0, 1]  → LFO 1 in 0.0 - 0.25 Hz (LFO 2 in 0.0 - 0.35 Hz)
  depth   [0, 10] → excursion 0 - 384 samples
*/

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, LfoIndex, Reserve, Segment};
use crate::dsp::codec::Fixed16;
use crate::dsp::lfo::Lfo;
use crate::dsp::mix::blend_dry_wet;
use crate::error::Result;
use std::f32::consts::FRAC_PI_2;

const CAPACITY: usize = 2048;
const LAYOUT: [Reserve; 1] = [Reserve::new("line", 2047)];

const CENTER: f32 = 1024.0;
const MAX_EXCURSION: f32 = 384.0;
pub const MAX_DEPTH: f32 = 10.0;

const LFO1_MAX_HZ: f32 = 0.25;
const LFO2_MAX_HZ: f32 = 0.35;

const MIX: f32 = 0.5;

pub struct Chorus {
    arena: DelayArena<Fixed16>,
    line: Segment,
    rate: f32,
    depth: f32,
    excursion: f32,
}

impl Chorus {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let layout = ArenaLayout::new(CAPACITY, &LAYOUT)?;
        let line = layout.segment(0);
        let arena = DelayArena::new(layout).with_lfos(
            Lfo::new(sample_rate, 0.0, LFO1_MAX_HZ),
            Lfo::new(sample_rate, 0.0, LFO2_MAX_HZ).with_phase(FRAC_PI_2),
        );

        let mut chorus = Self {
            arena,
            line,
            rate: 0.0,
            depth: 0.0,
            excursion: 0.0,
        };
        chorus.set_rate(0.1);
        chorus.set_depth(0.15 * MAX_DEPTH);
        Ok(chorus)
    }

    /// Normalized rate in [0, 1].
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

    /// Depth in [0, 10].
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, MAX_DEPTH);
        self.excursion = MAX_EXCURSION * self.depth / MAX_DEPTH;
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }
}

impl Effect for Chorus {
    fn name(&self) -> &'static str {
        "chorus"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let line = self.line;
        let a = self.excursion;
        let mut c = self.arena.start();

        c.load(0.5 * (in_l + in_r));
        c.write(line, 0, 0.0);

        c.interpolate_lfo(line, CENTER, LfoIndex::Lfo1, a, 0.5);
        c.interpolate_lfo(line, CENTER, LfoIndex::Lfo2, a, 0.5);
        let wet_l = c.store(0.0);

        c.interpolate_lfo(line, CENTER, LfoIndex::Lfo1, -a, 0.5);
        c.interpolate_lfo(line, CENTER, LfoIndex::Lfo2, -a, 0.5);
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
