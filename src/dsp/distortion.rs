//! Waveshaping curves for the tube stage.
//!
//! A waveshaper applies a transfer function to each driven sample:
//!   output = f(input * drive)
//!
//! At low drive the signal stays in the near-linear part of f() and passes
//! mostly unchanged. As drive increases it reaches the bend of the curve and
//! picks up harmonics.
//!
//! Soft Clip:
//!   f(x) = x / (1 + |x|)
//!   - Cheap, no transcendental functions
//!   - Odd-symmetric, so only odd harmonics
//!
//! Asymmetric Tube:
//!   positive half through tanh, negative half through the softer
//!   x / (1 + |x|). The mismatch adds even harmonics, the "warm" part of a
//!   triode stage.

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Asymmetric tube curve: tanh above zero, soft clip below.
#[inline]
pub fn tube_shape(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    if x >= 0.0 {
        x.tanh()
    } else {
        soft_clip(x, 1.0)
    }
}
