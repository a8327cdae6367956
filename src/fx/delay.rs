//! Stereo feedback delay on 16-bit memory.
//!
//! Left and right lines hold up to one second each and run independent
//! times. The repeat path is darkened by a one-pole low-pass before it is
//! mixed back into the line, so echoes lose top end as they decay.
//!
//! ```text
//!   x ──(+)──▶ [ line ]──tap(time)──┬──▶ out (wet only)
//!        ▲                          │
//!        └── × feedback ◀── lp ◀────┘
//! ```

use super::Effect;
use crate::dsp::arena::{ArenaLayout, DelayArena, Reserve, Segment};
use crate::dsp::codec::Fixed16;
use crate::error::Result;

pub const MAX_DELAY_SECONDS: f32 = 1.0;
pub const MAX_FEEDBACK: f32 = 0.99;

/// One-pole coefficient of the repeat low-pass.
const TONE: f32 = 0.6;

pub struct Delay {
    arena: DelayArena<Fixed16>,
    left: Segment,
    right: Segment,
    max_delay: usize,
    left_time: f32,
    right_time: f32,
    left_samples: i32,
    right_samples: i32,
    feedback: f32,
    tone_l: f32,
    tone_r: f32,
}

impl Delay {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let max_delay = ((sample_rate * MAX_DELAY_SECONDS) as usize).max(2);
        let layout = ArenaLayout::fit(&[
            Reserve::new("left", max_delay),
            Reserve::new("right", max_delay),
        ])?;
        let left = layout.segment(0);
        let right = layout.segment(1);

        let mut delay = Self {
            arena: DelayArena::new(layout),
            left,
            right,
            max_delay,
            left_time: 0.0,
            right_time: 0.0,
            left_samples: 1,
            right_samples: 1,
            feedback: 0.0,
            tone_l: 0.0,
            tone_r: 0.0,
        };
        delay.set_left_delay_time(0.15);
        delay.set_right_delay_time(0.22);
        delay.set_feedback(0.35);
        Ok(delay)
    }

    fn time_to_samples(&self, time: f32) -> i32 {
        ((time * self.max_delay as f32).round() as usize).clamp(1, self.max_delay) as i32
    }

    /// Left delay as a fraction of the maximum time, in [0, 1].
    pub fn set_left_delay_time(&mut self, time: f32) {
        self.left_time = time.clamp(0.0, 1.0);
        self.left_samples = self.time_to_samples(self.left_time);
    }

    pub fn left_delay_time(&self) -> f32 {
        self.left_time
    }

    /// Right delay as a fraction of the maximum time, in [0, 1].
    pub fn set_right_delay_time(&mut self, time: f32) {
        self.right_time = time.clamp(0.0, 1.0);
        self.right_samples = self.time_to_samples(self.right_time);
    }

    pub fn right_delay_time(&self) -> f32 {
        self.right_time
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Delay lengths in samples, `(left, right)`.
    pub fn delay_samples(&self) -> (usize, usize) {
        (self.left_samples as usize, self.right_samples as usize)
    }
}

impl Effect for Delay {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let (left, right) = (self.left, self.right);
        let (dl, dr) = (self.left_samples, self.right_samples);
        let feedback = self.feedback;
        let mut c = self.arena.start();

        c.read(left, dl, 1.0);
        let wet_l = c.accumulator();
        c.lp(&mut self.tone_l, TONE);
        c.store(feedback);
        c.add(in_l, 1.0);
        c.write(left, 0, 0.0);

        c.read(right, dr, 1.0);
        let wet_r = c.accumulator();
        c.lp(&mut self.tone_r, TONE);
        c.store(feedback);
        c.add(in_r, 1.0);
        c.write(right, 0, 0.0);

        (wet_l, wet_r)
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.tone_l = 0.0;
        self.tone_r = 0.0;
    }
}
