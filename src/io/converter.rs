/// Float sample to signed 16-bit, saturating outside [-1, 1).
#[inline]
pub fn float_to_q15(x: f32) -> i16 {
    (x * 32768.0).clamp(-32768.0, 32767.0) as i16
}

/// Signed 16-bit sample back to float in [-1, 1).
#[inline]
pub fn q15_to_float(x: i16) -> f32 {
    x as f32 / 32768.0
}

/// Interleave split float channels into `[L, R, L, R, ...]` 16-bit frames.
///
/// Writes `min(left.len(), right.len())` frames and returns that count.
pub fn interleave_q15(left: &[f32], right: &[f32], out: &mut [i16]) -> usize {
    let frames = left.len().min(right.len());
    assert!(out.len() >= frames * 2);
    for ((frame, &l), &r) in out.chunks_exact_mut(2).zip(left).zip(right) {
        frame[0] = float_to_q15(l);
        frame[1] = float_to_q15(r);
    }
    frames
}
