use std::ops::RangeInclusive;

use crate::console::FxRack;
use crate::fx::EffectSlot;

/// Every integer-valued effect parameter the control surface exposes.
///
/// Values live in application ranges (`0..=1` for enables, `0..=99` for
/// most knobs) and are mapped onto each effect's own scale by [`apply`].
///
/// [`apply`]: FxParameter::apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FxParameter {
    TubeEnable,
    TubeOverdrive,

    ChorusEnable,
    ChorusRate,
    ChorusDepth,

    FlangerEnable,
    FlangerRate,
    FlangerDepth,
    FlangerFeedback,

    OrbitoneEnable,
    OrbitoneRate,
    OrbitoneDepth,

    PhaserEnable,
    PhaserRate,
    PhaserDepth,
    PhaserFeedback,
    PhaserNbStages,

    DelayEnable,
    DelayLeftDelayTime,
    DelayRightDelayTime,
    DelayFeedback,

    PlateReverbEnable,
    PlateReverbSize,
    PlateReverbHighDamp,
    PlateReverbLowDamp,
    PlateReverbLowPass,
    PlateReverbDiffusion,
    PlateReverbLevel,

    ReverberatorEnable,
    ReverberatorInputGain,
    ReverberatorTime,
    ReverberatorDiffusion,
    ReverberatorLP,
}

use FxParameter::*;

impl FxParameter {
    pub const COUNT: usize = 33;

    pub const ALL: [FxParameter; Self::COUNT] = [
        TubeEnable,
        TubeOverdrive,
        ChorusEnable,
        ChorusRate,
        ChorusDepth,
        FlangerEnable,
        FlangerRate,
        FlangerDepth,
        FlangerFeedback,
        OrbitoneEnable,
        OrbitoneRate,
        OrbitoneDepth,
        PhaserEnable,
        PhaserRate,
        PhaserDepth,
        PhaserFeedback,
        PhaserNbStages,
        DelayEnable,
        DelayLeftDelayTime,
        DelayRightDelayTime,
        DelayFeedback,
        PlateReverbEnable,
        PlateReverbSize,
        PlateReverbHighDamp,
        PlateReverbLowDamp,
        PlateReverbLowPass,
        PlateReverbDiffusion,
        PlateReverbLevel,
        ReverberatorEnable,
        ReverberatorInputGain,
        ReverberatorTime,
        ReverberatorDiffusion,
        ReverberatorLP,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<FxParameter> {
        Self::ALL.get(index).copied()
    }

    pub fn is_enable(self) -> bool {
        matches!(
            self,
            TubeEnable
                | ChorusEnable
                | FlangerEnable
                | OrbitoneEnable
                | PhaserEnable
                | DelayEnable
                | PlateReverbEnable
                | ReverberatorEnable
        )
    }

    /// Accepted integer range. Values outside it are clamped, never rejected.
    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            p if p.is_enable() => 0..=1,
            PhaserNbStages => 2..=24,
            _ => 0..=99,
        }
    }

    pub fn clamp(self, value: i32) -> u8 {
        let range = self.range();
        value.clamp(*range.start() as i32, *range.end() as i32) as u8
    }

    /// Value of the stock performance.
    pub fn default_value(self) -> u8 {
        match self {
            TubeEnable => 1,
            TubeOverdrive => 10,

            ChorusEnable => 1,
            ChorusRate => 50,
            ChorusDepth => 50,

            FlangerEnable => 1,
            FlangerRate => 3,
            FlangerDepth => 75,
            FlangerFeedback => 50,

            OrbitoneEnable => 1,
            OrbitoneRate => 40,
            OrbitoneDepth => 50,

            PhaserEnable => 1,
            PhaserRate => 5,
            PhaserDepth => 99,
            PhaserFeedback => 50,
            PhaserNbStages => 12,

            DelayEnable => 1,
            DelayLeftDelayTime => 15,
            DelayRightDelayTime => 22,
            DelayFeedback => 35,

            PlateReverbEnable => 1,
            PlateReverbSize => 70,
            PlateReverbHighDamp => 50,
            PlateReverbLowDamp => 50,
            PlateReverbLowPass => 30,
            PlateReverbDiffusion => 65,
            PlateReverbLevel => 99,

            ReverberatorEnable => 1,
            ReverberatorInputGain => 99,
            ReverberatorTime => 80,
            ReverberatorDiffusion => 80,
            ReverberatorLP => 70,
        }
    }

    /// Push an already-clamped value into the rack.
    pub(crate) fn apply(self, rack: &mut FxRack, value: u8) {
        let unit = value as f32 / 99.0;
        let feedback = value as f32 * 0.97 / 99.0;
        let muted = value == 0;

        match self {
            TubeEnable => rack.tube.set_mute(muted),
            TubeOverdrive => rack.tube.set_overdrive(unit),

            ChorusEnable => rack.chorus.set_mute(muted),
            ChorusRate => rack.chorus.set_rate(unit),
            ChorusDepth => rack.chorus.set_depth(value as f32 / 9.9),

            FlangerEnable => rack.flanger.set_mute(muted),
            FlangerRate => rack.flanger.set_rate(unit),
            FlangerDepth => rack.flanger.set_depth(unit),
            FlangerFeedback => rack.flanger.set_feedback(feedback),

            OrbitoneEnable => rack.orbitone.set_mute(muted),
            OrbitoneRate => rack.orbitone.set_rate(unit),
            OrbitoneDepth => rack.orbitone.set_depth(unit),

            PhaserEnable => rack.phaser.set_mute(muted),
            PhaserRate => rack.phaser.set_rate(unit),
            PhaserDepth => rack.phaser.set_depth(unit),
            PhaserFeedback => rack.phaser.set_feedback(feedback),
            PhaserNbStages => rack.phaser.set_nb_stages(value as usize),

            DelayEnable => rack.delay.set_mute(muted),
            DelayLeftDelayTime => rack.delay.set_left_delay_time(unit),
            DelayRightDelayTime => rack.delay.set_right_delay_time(unit),
            DelayFeedback => rack.delay.set_feedback(unit),

            PlateReverbEnable => rack.plate_reverb.set_mute(muted),
            PlateReverbSize => rack.plate_reverb.set_size(unit),
            PlateReverbHighDamp => rack.plate_reverb.set_hidamp(unit),
            PlateReverbLowDamp => rack.plate_reverb.set_lodamp(unit),
            PlateReverbLowPass => rack.plate_reverb.set_lowpass(unit),
            PlateReverbDiffusion => rack.plate_reverb.set_diffusion(unit),
            PlateReverbLevel => rack.plate_reverb.set_level(unit),

            ReverberatorEnable => rack.reverberator.set_mute(muted),
            ReverberatorInputGain => rack.reverberator.set_input_gain(unit),
            ReverberatorTime => rack.reverberator.set_time(unit),
            ReverberatorDiffusion => rack.reverberator.set_diffusion(unit),
            ReverberatorLP => rack.reverberator.set_lp(unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, p) in FxParameter::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(FxParameter::from_index(i), Some(*p));
        }
    }

    #[test]
    fn test_defaults_inside_ranges() {
        for p in FxParameter::ALL {
            assert!(p.range().contains(&p.default_value()), "{:?}", p);
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(PhaserNbStages.clamp(0), 2);
        assert_eq!(PhaserNbStages.clamp(100), 24);
        assert_eq!(DelayEnable.clamp(5), 1);
        assert_eq!(ChorusRate.clamp(-3), 0);
        assert_eq!(ChorusRate.clamp(250), 99);
    }

    #[test]
    fn test_apply_maps_to_effect_scale() {
        let mut rack = FxRack::new(48_000.0).unwrap();
        ChorusDepth.apply(&mut rack, 99);
        assert!((rack.chorus.depth() - 10.0).abs() < 1e-4);

        FlangerFeedback.apply(&mut rack, 99);
        assert!((rack.flanger.feedback() - 0.97).abs() < 1e-6);

        PhaserNbStages.apply(&mut rack, 7);
        assert_eq!(rack.phaser.nb_stages(), 7);

        ReverberatorTime.apply(&mut rack, 0);
        assert_eq!(rack.reverberator.time(), 0.0);
    }

    #[test]
    fn test_enable_toggles_mute() {
        let mut rack = FxRack::new(48_000.0).unwrap();
        DelayEnable.apply(&mut rack, 0);
        assert!(rack.delay.is_muted());
        DelayEnable.apply(&mut rack, 1);
        assert!(!rack.delay.is_muted());
    }
}
