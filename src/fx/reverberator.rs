//! Reverberator: diffuser chain into a two-branch modulated tank.
//!
//! ```text
//!   (L+R)·gain ─▶ AP1 ▶ AP2 ▶ AP3 ▶ AP4 ─▶ apout
//!
//!   apout + krt·del2(lfo2) ─▶ lp ─▶ DAP1a ▶ DAP1b ─▶ del1 ─▶ wet L
//!   apout + krt·del1(lfo1) ─▶ lp ─▶ DAP2a ▶ DAP2b ─▶ del2 ─▶ wet R
//! ```
//!
//! Each branch reads the other's delay through a slowly modulated tap, so
//! energy circulates left → right → left and the modulation keeps the
//! tail from ringing at fixed modes. The first diffuser is smeared too: a
//! modulated read of its own line is written back a few samples further in.
//!
//! The whole structure lives in a single 16 k-slot, 16-bit arena.

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, LfoIndex, Reserve, Segment, TAIL};
use crate::dsp::codec::Fixed16;
use crate::dsp::lfo::Lfo;
use crate::error::Result;

const CAPACITY: usize = 16384;

const LAYOUT: [Reserve; 10] = [
    Reserve::new("ap1", 113),
    Reserve::new("ap2", 162),
    Reserve::new("ap3", 241),
    Reserve::new("ap4", 399),
    Reserve::new("dap1a", 1653),
    Reserve::new("dap1b", 2038),
    Reserve::new("del1", 3411),
    Reserve::new("dap2a", 1913),
    Reserve::new("dap2b", 1663),
    Reserve::new("del2", 4782),
];

const LFO1_HZ: f32 = 0.5;
const LFO2_HZ: f32 = 0.3;

struct Lines {
    ap: [Segment; 4],
    dap1a: Segment,
    dap1b: Segment,
    del1: Segment,
    dap2a: Segment,
    dap2b: Segment,
    del2: Segment,
}

pub struct Reverberator {
    arena: DelayArena<Fixed16>,
    lines: Lines,

    input_gain: f32,
    time: f32,
    diffusion: f32,
    lp: f32,

    lp_decay_1: f32,
    lp_decay_2: f32,
}

impl Reverberator {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let layout = ArenaLayout::new(CAPACITY, &LAYOUT)?;
        let lines = Lines {
            ap: [
                layout.segment(0),
                layout.segment(1),
                layout.segment(2),
                layout.segment(3),
            ],
            dap1a: layout.segment(4),
            dap1b: layout.segment(5),
            del1: layout.segment(6),
            dap2a: layout.segment(7),
            dap2b: layout.segment(8),
            del2: layout.segment(9),
        };
        let arena = DelayArena::new(layout).with_lfos(
            Lfo::new(sample_rate, LFO1_HZ, LFO1_HZ),
            Lfo::new(sample_rate, LFO2_HZ, LFO2_HZ),
        );

        let mut reverb = Self {
            arena,
            lines,
            input_gain: 0.0,
            time: 0.0,
            diffusion: 0.0,
            lp: 0.0,
            lp_decay_1: 0.0,
            lp_decay_2: 0.0,
        };
        reverb.set_input_gain(1.0);
        reverb.set_time(0.8);
        reverb.set_diffusion(0.8);
        reverb.set_lp(0.7);
        Ok(reverb)
    }

    pub fn set_input_gain(&mut self, gain: f32) {
        self.input_gain = gain.clamp(0.0, 1.0);
    }

    pub fn input_gain(&self) -> f32 {
        self.input_gain
    }

    /// Decay time in [0, 1].
    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, 1.0);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_diffusion(&mut self, diffusion: f32) {
        self.diffusion = diffusion.clamp(0.0, 1.0);
    }

    pub fn diffusion(&self) -> f32 {
        self.diffusion
    }

    /// Tank brightness in [0, 1]; lower is darker.
    pub fn set_lp(&mut self, lp: f32) {
        self.lp = lp.clamp(0.0, 1.0);
    }

    pub fn lp(&self) -> f32 {
        self.lp
    }
}

impl Effect for Reverberator {
    fn name(&self) -> &'static str {
        "reverberator"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let gain = self.input_gain * 0.2;
        let krt = 0.35 + 0.63 * self.time;
        let kap = 0.75 * self.diffusion;
        let klp = 0.05 + 0.95 * self.lp;
        let lines = &self.lines;
        let [ap1, ap2, ap3, ap4] = lines.ap;

        let mut c = self.arena.start();

        // Smear AP1 inside the loop.
        c.interpolate_lfo(ap1, 56.0, LfoIndex::Lfo1, 50.0, 1.0);
        c.write(ap1, 100, 0.0);

        c.load(0.0);
        c.add(in_l + in_r, gain);
        for ap in [ap1, ap2, ap3, ap4] {
            c.read(ap, TAIL, kap);
            c.write_all_pass(ap, 0, -kap);
        }
        let apout = c.store(0.0);

        c.load(apout);
        c.interpolate_lfo(lines.del2, 4680.0, LfoIndex::Lfo2, 100.0, krt);
        c.lp(&mut self.lp_decay_1, klp);
        c.read(lines.dap1a, TAIL, -kap);
        c.write_all_pass(lines.dap1a, 0, kap);
        c.read(lines.dap1b, TAIL, kap);
        c.write_all_pass(lines.dap1b, 0, -kap);
        c.write(lines.del1, 0, 2.0);
        let wet_l = c.store(0.0);

        c.load(apout);
        c.interpolate_lfo(lines.del1, 3300.0, LfoIndex::Lfo1, 50.0, krt);
        c.lp(&mut self.lp_decay_2, klp);
        c.read(lines.dap2a, TAIL, kap);
        c.write_all_pass(lines.dap2a, 0, -kap);
        c.read(lines.dap2b, TAIL, -kap);
        c.write_all_pass(lines.dap2b, 0, kap);
        c.write(lines.del2, 0, 2.0);
        let wet_r = c.store(0.0);

        (wet_l, wet_r)
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.lp_decay_1 = 0.0;
        self.lp_decay_2 = 0.0;
    }
}
