/// Effect destinations plus the main output, in processing order.
///
/// Every bus but [`Bus::MainOutput`] produces a return that other buses can
/// pick up. The main output's processed sum is the console's final frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bus {
    Tube,
    Chorus,
    Flanger,
    Orbitone,
    Phaser,
    Delay,
    PlateReverb,
    Reverberator,
    MainOutput,
}

impl Bus {
    /// All buses, including the main output.
    pub const COUNT: usize = 9;

    /// Buses that produce a return signal.
    pub const FX_COUNT: usize = Self::COUNT - 1;

    pub const ALL: [Bus; Self::COUNT] = [
        Bus::Tube,
        Bus::Chorus,
        Bus::Flanger,
        Bus::Orbitone,
        Bus::Phaser,
        Bus::Delay,
        Bus::PlateReverb,
        Bus::Reverberator,
        Bus::MainOutput,
    ];

    pub const FX: [Bus; Self::FX_COUNT] = [
        Bus::Tube,
        Bus::Chorus,
        Bus::Flanger,
        Bus::Orbitone,
        Bus::Phaser,
        Bus::Delay,
        Bus::PlateReverb,
        Bus::Reverberator,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Bus> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn is_main(self) -> bool {
        self == Bus::MainOutput
    }

    pub fn name(self) -> &'static str {
        match self {
            Bus::Tube => "Tube",
            Bus::Chorus => "Chorus",
            Bus::Flanger => "Flanger",
            Bus::Orbitone => "Orbitone",
            Bus::Phaser => "Phaser",
            Bus::Delay => "Delay",
            Bus::PlateReverb => "PlateReverb",
            Bus::Reverberator => "Reverberator",
            Bus::MainOutput => "MainOutput",
        }
    }
}

impl std::fmt::Display for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
