use super::Bus;
use crate::error::Result;
use crate::fx::{
    Chorus, Delay, Dry, EffectSlot, Flanger, FxUnit, Orbitone, Phaser, PlateReverb,
    Reverberator, Tube,
};

/// One effect unit per bus, typed for parameter access and reachable by bus
/// for uniform processing.
pub struct FxRack {
    pub tube: FxUnit<Tube>,
    pub chorus: FxUnit<Chorus>,
    pub flanger: FxUnit<Flanger>,
    pub orbitone: FxUnit<Orbitone>,
    pub phaser: FxUnit<Phaser>,
    pub delay: FxUnit<Delay>,
    pub plate_reverb: FxUnit<PlateReverb>,
    pub reverberator: FxUnit<Reverberator>,
    pub dry: FxUnit<Dry>,
}

impl FxRack {
    pub fn new(sample_rate: f32) -> Result<Self> {
        Ok(Self {
            tube: FxUnit::new(Tube::new(sample_rate)),
            chorus: FxUnit::new(Chorus::new(sample_rate)?),
            flanger: FxUnit::new(Flanger::new(sample_rate)?),
            orbitone: FxUnit::new(Orbitone::new(sample_rate)?),
            phaser: FxUnit::new(Phaser::new(sample_rate)),
            delay: FxUnit::new(Delay::new(sample_rate)?),
            plate_reverb: FxUnit::new(PlateReverb::new(sample_rate)?),
            reverberator: FxUnit::new(Reverberator::new(sample_rate)?),
            dry: FxUnit::new(Dry),
        })
    }

    pub fn slot(&self, bus: Bus) -> &dyn EffectSlot {
        match bus {
            Bus::Tube => &self.tube,
            Bus::Chorus => &self.chorus,
            Bus::Flanger => &self.flanger,
            Bus::Orbitone => &self.orbitone,
            Bus::Phaser => &self.phaser,
            Bus::Delay => &self.delay,
            Bus::PlateReverb => &self.plate_reverb,
            Bus::Reverberator => &self.reverberator,
            Bus::MainOutput => &self.dry,
        }
    }

    #[inline]
    pub fn slot_mut(&mut self, bus: Bus) -> &mut dyn EffectSlot {
        match bus {
            Bus::Tube => &mut self.tube,
            Bus::Chorus => &mut self.chorus,
            Bus::Flanger => &mut self.flanger,
            Bus::Orbitone => &mut self.orbitone,
            Bus::Phaser => &mut self.phaser,
            Bus::Delay => &mut self.delay,
            Bus::PlateReverb => &mut self.plate_reverb,
            Bus::Reverberator => &mut self.reverberator,
            Bus::MainOutput => &mut self.dry,
        }
    }
}
