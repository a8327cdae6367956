//! Gain, pan and summing primitives for the routing matrix.

/*
Routing Gains
=============

Every bus of the console is a weighted sum over a shared source vector:

    bus_out = Σ  level[bus][source] × source_sample

The sources are the input channels followed by the effect returns. Weights
are plain linear gains in [0, 1]. A weight of exactly zero means "not routed"
and the source is skipped entirely, so a NaN or infinity on an unrouted
source can never leak into a bus.

If the sum over the routed sources comes out NaN (a routed source went bad,
or two infinities cancelled) the whole bus input is silence for that sample
rather than poisoning every later sample of the mix.


Constant-Power Pan
------------------

A channel strip turns (level, pan) into a gain pair:

    gain_left  = cos(pan × π/2) × level
    gain_right = sin(pan × π/2) × level

    pan = 0.0  →  (level, 0)        hard left
    pan = 0.5  →  (0.707·level, 0.707·level)
    pan = 1.0  →  (0, level)        hard right

Because cos² + sin² = 1, the total power stays constant as the source moves
across the field. A linear pan (1-pan, pan) would dip by 3 dB in the middle,
the same loudness hole the linear crossfade has.

    Gain
      1.0 ─╮                   ╭─
            ╲ L             R ╱
      0.7     ────────╳────────      ← both sides at -3 dB
            ╱                 ╲
      0.0 ─╯                   ╰─
          0.0       0.5       1.0
                    pan

A level of zero forces both gains to exactly zero.


Dry/Wet
-------

Effects that keep some of their input blend it linearly:

    output = dry × (1 - mix) + wet × mix
*/

use std::f32::consts::FRAC_PI_2;

/// Constant-power gain pair for a channel at `pan` with `level`.
#[inline]
pub fn constant_power_gains(pan: f32, level: f32) -> (f32, f32) {
    if level == 0.0 {
        return (0.0, 0.0);
    }
    let angle = pan * FRAC_PI_2;
    (angle.cos() * level, angle.sin() * level)
}

/// Σ weights[i] × sources[i] over non-zero weights; a NaN sum becomes 0.
#[inline]
pub fn weighted_sum(weights: &[f32], sources: &[f32]) -> f32 {
    debug_assert_eq!(weights.len(), sources.len());

    let mut acc = 0.0;
    for (&w, &s) in weights.iter().zip(sources.iter()) {
        if w != 0.0 {
            acc += w * s;
        }
    }
    if acc.is_nan() {
        0.0
    } else {
        acc
    }
}

/// out[i] = input[i] × gain
#[inline]
pub fn scale_into(input: &[f32], gain: f32, out: &mut [f32]) {
    debug_assert_eq!(input.len(), out.len());

    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = x * gain;
    }
}

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}
