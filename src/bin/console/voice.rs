//! Detuned sine voices used as console channels.

use std::f32::consts::TAU;

use saavy_console::ChannelSource;

/// Free-running sine with a slow tremolo so the mix keeps moving.
pub struct SineVoice {
    phase: f32,
    increment: f32,
    tremolo_phase: f32,
    tremolo_increment: f32,
    amplitude: f32,
}

impl SineVoice {
    pub fn new(sample_rate: f32, frequency: f32, tremolo_hz: f32, amplitude: f32) -> Self {
        Self {
            phase: 0.0,
            increment: TAU * frequency / sample_rate,
            tremolo_phase: 0.0,
            tremolo_increment: TAU * tremolo_hz / sample_rate,
            amplitude,
        }
    }
}

impl ChannelSource for SineVoice {
    fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            let tremolo = 0.75 + 0.25 * self.tremolo_phase.sin();
            *sample = self.amplitude * tremolo * self.phase.sin();

            self.phase += self.increment;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
            self.tremolo_phase += self.tremolo_increment;
            if self.tremolo_phase >= TAU {
                self.tremolo_phase -= TAU;
            }
        }
    }
}

/// A minor-ninth stack spread over eight voices, each slightly detuned.
pub fn chord(sample_rate: f32, count: usize) -> Vec<Box<dyn ChannelSource>> {
    const ROOTS: [f32; 8] = [110.0, 164.81, 220.0, 261.63, 329.63, 392.0, 493.88, 587.33];
    (0..count)
        .map(|i| {
            let detune = 1.0 + (i as f32 - count as f32 / 2.0) * 0.0015;
            let frequency = ROOTS[i % ROOTS.len()] * detune;
            let tremolo = 0.1 + 0.07 * i as f32;
            Box::new(SineVoice::new(sample_rate, frequency, tremolo, 0.12))
                as Box<dyn ChannelSource>
        })
        .collect()
}
