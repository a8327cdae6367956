//! Effect algorithms and the slot wrapper the console drives them through.
//!
//! Every effect is a stereo, per-sample [`Effect`]. The console never holds
//! effects directly; it holds [`FxUnit`]s, which add the bypass and mute
//! switches every bus shares, and talks to them through the object-safe
//! [`EffectSlot`] interface so the nine kinds can sit in one table indexed
//! by bus.
//!
//! ```text
//!            ┌──────────── FxUnit<E> ────────────┐
//!   in L/R ──┤ mute?   → (0, 0)                  ├── out L/R
//!            │ bypass? → (in L, in R)            │
//!            │ else    → E::process_sample       │
//!            └───────────────────────────────────┘
//! ```

pub mod chorus;
pub mod delay;
pub mod dry;
pub mod flanger;
pub mod orbitone;
pub mod phaser;
pub mod plate_reverb;
pub mod reverberator;
pub mod tube;

pub use chorus::Chorus;
pub use delay::Delay;
pub use dry::Dry;
pub use flanger::Flanger;
pub use orbitone::Orbitone;
pub use phaser::Phaser;
pub use plate_reverb::PlateReverb;
pub use reverberator::Reverberator;
pub use tube::Tube;

use std::ops::{Deref, DerefMut};

/// A stereo effect algorithm.
///
/// Implementations must be realtime-safe: no allocation, no locking, no I/O
/// inside `process_sample`.
pub trait Effect: Send {
    /// Short display name.
    fn name(&self) -> &'static str;

    /// Process one stereo frame.
    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32);

    /// Clear internal state (delay memory, filter states, LFO phases).
    fn reset(&mut self);
}

/// Uniform handle over any effect wrapped in an [`FxUnit`].
pub trait EffectSlot: Send {
    fn name(&self) -> &'static str;

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32);

    fn reset(&mut self);

    fn set_bypass(&mut self, bypass: bool);

    fn is_bypassed(&self) -> bool;

    fn set_mute(&mut self, mute: bool);

    fn is_muted(&self) -> bool;
}

/// Effect plus bypass and mute state.
///
/// Mute wins over bypass. Changing the bypass flag resets the effect so it
/// never resumes with stale delay memory.
pub struct FxUnit<E> {
    effect: E,
    bypass: bool,
    mute: bool,
}

impl<E: Effect> FxUnit<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            bypass: false,
            mute: false,
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }
}

impl<E: Effect> EffectSlot for FxUnit<E> {
    fn name(&self) -> &'static str {
        self.effect.name()
    }

    #[inline]
    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        if self.mute {
            (0.0, 0.0)
        } else if self.bypass {
            (in_l, in_r)
        } else {
            self.effect.process_sample(in_l, in_r)
        }
    }

    fn reset(&mut self) {
        self.effect.reset();
    }

    fn set_bypass(&mut self, bypass: bool) {
        if self.bypass != bypass {
            self.bypass = bypass;
            self.effect.reset();
        }
    }

    fn is_bypassed(&self) -> bool {
        self.bypass
    }

    fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    fn is_muted(&self) -> bool {
        self.mute
    }
}

impl<E> Deref for FxUnit<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.effect
    }
}

impl<E> DerefMut for FxUnit<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Doubles its input and counts resets.
    struct Doubler {
        resets: usize,
    }

    impl Effect for Doubler {
        fn name(&self) -> &'static str {
            "doubler"
        }

        fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
            (in_l * 2.0, in_r * 2.0)
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_active_unit_runs_effect() {
        let mut unit = FxUnit::new(Doubler { resets: 0 });
        assert_eq!(unit.process_sample(0.25, -0.5), (0.5, -1.0));
    }

    #[test]
    fn test_bypass_passes_input_through() {
        let mut unit = FxUnit::new(Doubler { resets: 0 });
        unit.set_bypass(true);
        assert_eq!(unit.process_sample(0.25, -0.5), (0.25, -0.5));
    }

    #[test]
    fn test_mute_wins_over_bypass() {
        let mut unit = FxUnit::new(Doubler { resets: 0 });
        unit.set_bypass(true);
        unit.set_mute(true);
        assert_eq!(unit.process_sample(0.25, -0.5), (0.0, 0.0));
    }

    #[test]
    fn test_bypass_change_resets_once() {
        let mut unit = FxUnit::new(Doubler { resets: 0 });
        unit.set_bypass(true);
        unit.set_bypass(true);
        assert_eq!(unit.resets, 1);
        unit.set_bypass(false);
        assert_eq!(unit.resets, 2);
    }

    #[test]
    fn test_slot_table_dispatch() {
        let mut a = FxUnit::new(Doubler { resets: 0 });
        let mut b = FxUnit::new(dry::Dry);
        let slots: [&mut dyn EffectSlot; 2] = [&mut a, &mut b];
        let names: Vec<_> = slots.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["doubler", "dry"]);
    }
}
