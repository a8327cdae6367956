//! Tube-style overdrive.
//!
//! Drive scales from clean (1×) to heavy (20×) and feeds the asymmetric
//! [`tube_shape`] curve. Output is normalized so a full-scale positive peak
//! still lands near unity whatever the drive.

use super::Effect;
use crate::dsp::distortion::tube_shape;

const MAX_DRIVE: f32 = 20.0;

pub struct Tube {
    overdrive: f32,
    drive: f32,
    makeup: f32,
}

impl Tube {
    pub fn new(_sample_rate: f32) -> Self {
        let mut tube = Self {
            overdrive: 0.0,
            drive: 1.0,
            makeup: 1.0,
        };
        tube.set_overdrive(0.0);
        tube
    }

    /// Overdrive amount in [0, 1].
    pub fn set_overdrive(&mut self, overdrive: f32) {
        self.overdrive = overdrive.clamp(0.0, 1.0);
        self.drive = 1.0 + (MAX_DRIVE - 1.0) * self.overdrive;
        self.makeup = 1.0 / tube_shape(1.0, self.drive);
    }

    pub fn overdrive(&self) -> f32 {
        self.overdrive
    }
}

impl Effect for Tube {
    fn name(&self) -> &'static str {
        "tube"
    }

    #[inline]
    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        (
            tube_shape(in_l, self.drive) * self.makeup,
            tube_shape(in_r, self.drive) * self.makeup,
        )
    }

    fn reset(&mut self) {}
}
