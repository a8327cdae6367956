use super::Effect;

/// Passthrough for the main output bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dry;

impl Effect for Dry {
    fn name(&self) -> &'static str {
        "dry"
    }

    #[inline]
    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        (in_l, in_r)
    }

    fn reset(&mut self) {}
}
