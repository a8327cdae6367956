//! Low Frequency Oscillator used to move delay taps.

/*
Modulated Delay Reads
=====================

Chorus, flanger, ensemble and the reverb tanks all read their delay memory at
a position that drifts over time. The drift comes from an LFO: a sine at a
fraction of a hertz whose output displaces the read offset.

    offset(t) = center + amplitude * lfo(t)

Moving the read head changes the playback speed of the delayed copy, which
detunes it slightly. A few samples of movement at 0.5 Hz is enough to smear
the metallic ringing out of a reverb tank; a few hundred samples gives the
classic chorus shimmer.

Frequency Range
---------------

Each LFO owns a [min, max] frequency range. Control surfaces hand it a
normalized value in [0, 1] which is mapped linearly into that range:

    frequency = min + normalized * (max - min)

so a chorus rate knob never leaves the musically useful band, whatever the
controller sends.

Free Running
------------

These LFOs are never retriggered by notes. They advance once per processed
sample and only return to their initial phase on an explicit reset (when an
effect is re-enabled). Two LFOs in one arena can start in quadrature to give
stereo movement.
*/

use std::f32::consts::TAU;

/// Free-running sine LFO with a bounded frequency range.
#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f32,
    min_frequency: f32,
    max_frequency: f32,
    normalized_frequency: f32,
    initial_phase: f32,
    phase: f32,
    phase_increment: f32,
}

impl Lfo {
    /// Create an LFO whose normalized frequency maps onto
    /// `[min_frequency, max_frequency]` Hz. Starts at the minimum.
    pub fn new(sample_rate: f32, min_frequency: f32, max_frequency: f32) -> Self {
        let min_frequency = min_frequency.max(0.0);
        let max_frequency = max_frequency.max(min_frequency);
        let mut lfo = Self {
            sample_rate,
            min_frequency,
            max_frequency,
            normalized_frequency: 0.0,
            initial_phase: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
        };
        lfo.set_normalized_frequency(0.0);
        lfo
    }

    /// Start (and reset) at the given phase in radians.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.initial_phase = phase.rem_euclid(TAU);
        self.phase = self.initial_phase;
        self
    }

    pub fn set_normalized_frequency(&mut self, normalized: f32) {
        self.normalized_frequency = normalized.clamp(0.0, 1.0);
        let frequency = self.min_frequency
            + self.normalized_frequency * (self.max_frequency - self.min_frequency);
        self.phase_increment = TAU * frequency / self.sample_rate;
    }

    /// Set the frequency in Hz, clamped to the LFO's range.
    pub fn set_frequency(&mut self, frequency: f32) {
        let span = self.max_frequency - self.min_frequency;
        let normalized = if span > 0.0 {
            (frequency - self.min_frequency) / span
        } else {
            0.0
        };
        self.set_normalized_frequency(normalized);
    }

    pub fn frequency(&self) -> f32 {
        self.phase_increment * self.sample_rate / TAU
    }

    pub fn normalized_frequency(&self) -> f32 {
        self.normalized_frequency
    }

    /// Current bipolar output without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.phase.sin()
    }

    /// Return the current output and advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let out = self.phase.sin();
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }

    pub fn reset(&mut self) {
        self.phase = self.initial_phase;
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unipolar_to_bipolar() {
        assert!((unipolar_to_bipolar(0.0) - (-1.0)).abs() < 1e-6);
        assert!((unipolar_to_bipolar(0.5) - 0.0).abs() < 1e-6);
        assert!((unipolar_to_bipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_frequency_maps_into_range() {
        let mut lfo = Lfo::new(48_000.0, 0.5, 2.5);
        lfo.set_normalized_frequency(0.5);
        assert!((lfo.frequency() - 1.5).abs() < 1e-3);

        lfo.set_normalized_frequency(4.0);
        assert!((lfo.frequency() - 2.5).abs() < 1e-3);
        assert_eq!(lfo.normalized_frequency(), 1.0);
    }

    #[test]
    fn test_frequency_clamped_to_range() {
        let mut lfo = Lfo::new(48_000.0, 0.1, 1.0);
        lfo.set_frequency(50.0);
        assert!((lfo.frequency() - 1.0).abs() < 1e-3);
        lfo.set_frequency(0.0);
        assert!((lfo.frequency() - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_output_bounded_and_periodic() {
        // 1 Hz at 1 kHz: exactly 1000 samples per cycle.
        let mut lfo = Lfo::new(1000.0, 1.0, 1.0);
        let first = lfo.process();
        for _ in 0..999 {
            let v = lfo.process();
            assert!((-1.0..=1.0).contains(&v));
        }
        assert!((lfo.process() - first).abs() < 1e-3);
    }

    #[test]
    fn test_reset_returns_to_initial_phase() {
        let mut lfo = Lfo::new(48_000.0, 1.0, 1.0).with_phase(std::f32::consts::FRAC_PI_2);
        assert!((lfo.value() - 1.0).abs() < 1e-6);
        for _ in 0..1234 {
            lfo.process();
        }
        lfo.reset();
        assert!((lfo.value() - 1.0).abs() < 1e-6);
    }
}
