//! Plate reverb: input diffusion into a figure-eight tank.

/*
Plate Reverb
============

The classic plate topology: the mono input is smeared by four all-passes,
then drives two cross-coupled tank halves. Each half is

    modulated all-pass → delay → damping (lp + hp) → all-pass → delay

and the tail of each half feeds the head of the other, scaled by the decay
gain. The stereo output is a signed sum of seven taps spread across both
halves, which decorrelates left and right.

    in ──▶ AP1 ▶ AP2 ▶ AP3 ▶ AP4 ──┬──────────────┐
                                   ▼              ▼
                          ┌──▶ (+) L-half    (+) R-half ◀──┐
                          │       │              │         │
                          │       ▼              ▼         │
                          └─ krt ◀ L tail    R tail ▶ krt ─┘
                             (crossed)       (crossed)

Lengths are tuned for ~48 kHz and the tank uses 16-bit memory, so the whole
structure fits one 64 k-slot arena.

Parameters (all [0, 1])
-----------------------

  size       decay gain, 0.2 - 0.98
  hidamp     high-frequency damping in the tank
  lodamp     low-frequency damping in the tank
  lowpass    output low-pass, 0 = open
  diffusion  all-pass coefficients
  level      output gain
*/

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, LfoIndex, Reserve, Segment, TAIL};
use crate::dsp::codec::Fixed16;
use crate::dsp::lfo::Lfo;
use crate::error::Result;
use std::f32::consts::FRAC_PI_2;

const CAPACITY: usize = 65536;

const LAYOUT: [Reserve; 12] = [
    Reserve::new("in_ap1", 227),
    Reserve::new("in_ap2", 171),
    Reserve::new("in_ap3", 605),
    Reserve::new("in_ap4", 443),
    Reserve::new("l_ap_mod", 1075),
    Reserve::new("l_del1", 7155),
    Reserve::new("l_ap2", 2900),
    Reserve::new("l_del2", 5987),
    Reserve::new("r_ap_mod", 1448),
    Reserve::new("r_del1", 6742),
    Reserve::new("r_ap2", 4042),
    Reserve::new("r_del2", 5030),
];

/// Modulation excursion of the tank all-passes, in samples.
const EXCURSION: f32 = 16.0;
const INPUT_GAIN: f32 = 0.5;
const TAP_GAIN: f32 = 0.6;

struct Lines {
    input: [Segment; 4],
    l_ap_mod: Segment,
    l_del1: Segment,
    l_ap2: Segment,
    l_del2: Segment,
    r_ap_mod: Segment,
    r_del1: Segment,
    r_ap2: Segment,
    r_del2: Segment,
}

pub struct PlateReverb {
    arena: DelayArena<Fixed16>,
    lines: Lines,

    size: f32,
    hidamp: f32,
    lodamp: f32,
    lowpass: f32,
    diffusion: f32,
    level: f32,

    krt: f32,
    k_in: f32,
    k_tank: f32,
    k_hidamp: f32,
    k_lodamp: f32,
    k_lowpass: f32,

    lp_l: f32,
    lp_r: f32,
    hp_l: f32,
    hp_r: f32,
    out_lp_l: f32,
    out_lp_r: f32,
}

impl PlateReverb {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let layout = ArenaLayout::new(CAPACITY, &LAYOUT)?;
        let lines = Lines {
            input: [
                layout.segment(0),
                layout.segment(1),
                layout.segment(2),
                layout.segment(3),
            ],
            l_ap_mod: layout.segment(4),
            l_del1: layout.segment(5),
            l_ap2: layout.segment(6),
            l_del2: layout.segment(7),
            r_ap_mod: layout.segment(8),
            r_del1: layout.segment(9),
            r_ap2: layout.segment(10),
            r_del2: layout.segment(11),
        };
        let arena = DelayArena::new(layout).with_lfos(
            Lfo::new(sample_rate, 1.0, 1.0),
            Lfo::new(sample_rate, 0.77, 0.77).with_phase(FRAC_PI_2),
        );

        let mut reverb = Self {
            arena,
            lines,
            size: 0.0,
            hidamp: 0.0,
            lodamp: 0.0,
            lowpass: 0.0,
            diffusion: 0.0,
            level: 0.0,
            krt: 0.0,
            k_in: 0.0,
            k_tank: 0.0,
            k_hidamp: 1.0,
            k_lodamp: 0.0,
            k_lowpass: 1.0,
            lp_l: 0.0,
            lp_r: 0.0,
            hp_l: 0.0,
            hp_r: 0.0,
            out_lp_l: 0.0,
            out_lp_r: 0.0,
        };
        reverb.set_size(0.7);
        reverb.set_hidamp(0.5);
        reverb.set_lodamp(0.5);
        reverb.set_lowpass(0.3);
        reverb.set_diffusion(0.65);
        reverb.set_level(1.0);
        Ok(reverb)
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size.clamp(0.0, 1.0);
        self.krt = 0.2 + 0.78 * self.size;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_hidamp(&mut self, hidamp: f32) {
        self.hidamp = hidamp.clamp(0.0, 1.0);
        self.k_hidamp = 1.0 - 0.9 * self.hidamp;
    }

    pub fn hidamp(&self) -> f32 {
        self.hidamp
    }

    pub fn set_lodamp(&mut self, lodamp: f32) {
        self.lodamp = lodamp.clamp(0.0, 1.0);
        self.k_lodamp = 0.001 + 0.05 * self.lodamp;
    }

    pub fn lodamp(&self) -> f32 {
        self.lodamp
    }

    pub fn set_lowpass(&mut self, lowpass: f32) {
        self.lowpass = lowpass.clamp(0.0, 1.0);
        self.k_lowpass = 1.0 - 0.95 * self.lowpass;
    }

    pub fn lowpass(&self) -> f32 {
        self.lowpass
    }

    pub fn set_diffusion(&mut self, diffusion: f32) {
        self.diffusion = diffusion.clamp(0.0, 1.0);
        self.k_in = 0.75 * self.diffusion;
        self.k_tank = 0.4 + 0.3 * self.diffusion;
    }

    pub fn diffusion(&self) -> f32 {
        self.diffusion
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Effect for PlateReverb {
    fn name(&self) -> &'static str {
        "plate reverb"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let k_in = self.k_in;
        let k_tank = self.k_tank;
        let krt = self.krt;
        let k_hidamp = self.k_hidamp;
        let k_lodamp = self.k_lodamp;
        let lines = &self.lines;
        let mut c = self.arena.start();

        // Input diffusion.
        c.load((in_l + in_r) * INPUT_GAIN);
        for &ap in &lines.input {
            c.read(ap, TAIL, k_in);
            c.write_all_pass(ap, 0, -k_in);
        }
        let diffused = c.store(0.0);

        // Tank tails from the previous pass, crossed over.
        c.read(lines.l_del2, TAIL, 1.0);
        let l_tail = c.store(0.0);
        c.read(lines.r_del2, TAIL, 1.0);
        let r_tail = c.store(0.0);

        let ap_mod_l = (lines.l_ap_mod.length() - 2) as f32 - EXCURSION;
        let ap_mod_r = (lines.r_ap_mod.length() - 2) as f32 - EXCURSION;

        // Left half.
        c.load(diffused);
        c.add(r_tail, krt);
        c.interpolate_lfo(lines.l_ap_mod, ap_mod_l, LfoIndex::Lfo1, EXCURSION, k_tank);
        c.write_all_pass(lines.l_ap_mod, 0, -k_tank);
        c.write(lines.l_del1, 0, 0.0);
        c.read(lines.l_del1, TAIL, 1.0);
        c.lp(&mut self.lp_l, k_hidamp);
        c.hp(&mut self.hp_l, k_lodamp);
        c.store(krt);
        c.read(lines.l_ap2, TAIL, k_tank);
        c.write_all_pass(lines.l_ap2, 0, -k_tank);
        c.write(lines.l_del2, 0, 0.0);

        // Right half.
        c.load(diffused);
        c.add(l_tail, krt);
        c.interpolate_lfo(lines.r_ap_mod, ap_mod_r, LfoIndex::Lfo2, EXCURSION, k_tank);
        c.write_all_pass(lines.r_ap_mod, 0, -k_tank);
        c.write(lines.r_del1, 0, 0.0);
        c.read(lines.r_del1, TAIL, 1.0);
        c.lp(&mut self.lp_r, k_hidamp);
        c.hp(&mut self.hp_r, k_lodamp);
        c.store(krt);
        c.read(lines.r_ap2, TAIL, k_tank);
        c.write_all_pass(lines.r_ap2, 0, -k_tank);
        c.write(lines.r_del2, 0, 0.0);

        // Output taps.
        c.read(lines.r_del1, 426, TAP_GAIN);
        c.read(lines.r_del1, 4758, TAP_GAIN);
        c.read(lines.r_ap2, 3061, -TAP_GAIN);
        c.read(lines.r_del2, 3194, TAP_GAIN);
        c.read(lines.l_del1, 3184, -TAP_GAIN);
        c.read(lines.l_ap2, 299, -TAP_GAIN);
        c.read(lines.l_del2, 1706, -TAP_GAIN);
        c.lp(&mut self.out_lp_l, self.k_lowpass);
        let wet_l = c.store(0.0);

        c.read(lines.l_del1, 565, TAP_GAIN);
        c.read(lines.l_del1, 5803, TAP_GAIN);
        c.read(lines.l_ap2, 1965, -TAP_GAIN);
        c.read(lines.l_del2, 4277, TAP_GAIN);
        c.read(lines.r_del1, 3378, -TAP_GAIN);
        c.read(lines.r_ap2, 536, -TAP_GAIN);
        c.read(lines.r_del2, 194, -TAP_GAIN);
        c.lp(&mut self.out_lp_r, self.k_lowpass);
        let wet_r = c.store(0.0);

        (wet_l * self.level, wet_r * self.level)
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.lp_l = 0.0;
        self.lp_r = 0.0;
        self.hp_l = 0.0;
        self.hp_r = 0.0;
        self.out_lp_l = 0.0;
        self.out_lp_r = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(reverb: &mut PlateReverb, samples: usize) -> f32 {
        (0..samples)
            .map(|_| {
                let (l, r) = reverb.process_sample(0.0, 0.0);
                l * l + r * r
            })
            .sum()
    }

    #[test]
    fn test_layout_fits_arena() {
        assert!(ArenaLayout::new(CAPACITY, &LAYOUT).is_ok());
    }

    #[test]
    fn test_impulse_builds_a_tail() {
        let mut reverb = PlateReverb::new(48_000.0).unwrap();
        reverb.process_sample(1.0, 1.0);
        assert!(energy(&mut reverb, 24_000) > 1e-4);
    }

    #[test]
    fn test_tail_decays() {
        let mut reverb = PlateReverb::new(48_000.0).unwrap();
        reverb.set_size(0.3);
        for _ in 0..100 {
            reverb.process_sample(0.5, 0.5);
        }
        let early = energy(&mut reverb, 24_000);
        // Skip ahead several tank round trips.
        energy(&mut reverb, 96_000);
        let late = energy(&mut reverb, 24_000);
        assert!(late < early * 0.1);
    }

    #[test]
    fn test_stereo_decorrelated() {
        let mut reverb = PlateReverb::new(48_000.0).unwrap();
        reverb.process_sample(1.0, 1.0);
        let mut differs = false;
        for _ in 0..20_000 {
            let (l, r) = reverb.process_sample(0.0, 0.0);
            if (l - r).abs() > 1e-4 {
                differs = true;
            }
        }
        assert!(differs);
    }

    #[test]
    fn test_zero_level_is_silent() {
        let mut reverb = PlateReverb::new(48_000.0).unwrap();
        reverb.set_level(0.0);
        for _ in 0..1000 {
            assert_eq!(reverb.process_sample(0.9, 0.9), (0.0, 0.0));
        }
    }

    #[test]
    fn test_reset_clears_tail() {
        let mut reverb = PlateReverb::new(48_000.0).unwrap();
        for _ in 0..5000 {
            reverb.process_sample(0.5, -0.2);
        }
        reverb.reset();
        assert_eq!(energy(&mut reverb, 20_000), 0.0);
    }
}
