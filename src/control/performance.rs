use super::FxParameter;
use crate::console::Bus;

/// Highest channel volume, pan and master volume value.
pub const MAX_MIDI_VALUE: u8 = 127;

/// Highest send, return and effect knob value.
pub const MAX_LEVEL_VALUE: u8 = 99;

/// Integer state of the whole mixer as the control surface sees it.
///
/// This is what gets stored with a patch. It holds no floats: every value is
/// re-mapped through the control setters when a performance is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MixerPerformance {
    /// Channel volume, `0..=127`.
    pub volume: Vec<u8>,
    /// Channel pan, `0..=127`, 64 is centre.
    pub pan: Vec<u8>,
    /// Channel → bus send levels, `0..=99`, indexed by `Bus::index()`.
    pub send_levels: Vec<[u8; Bus::COUNT]>,
    /// Effect return → bus levels, `0..=99`. Diagonal entries are always 0.
    pub return_levels: [[u8; Bus::COUNT]; Bus::FX_COUNT],
    /// Indexed by `FxParameter::index()`.
    pub fx_parameters: Vec<u8>,
    pub master_volume: u8,
    pub swap_stereo: bool,
}

impl MixerPerformance {
    /// Stock performance: every channel at volume 100, centred, sent only to
    /// the main output.
    pub fn new(channels: usize) -> Self {
        let mut main_only = [0; Bus::COUNT];
        main_only[Bus::MainOutput.index()] = MAX_LEVEL_VALUE;

        Self {
            volume: vec![100; channels],
            pan: vec![64; channels],
            send_levels: vec![main_only; channels],
            return_levels: [[0; Bus::COUNT]; Bus::FX_COUNT],
            fx_parameters: FxParameter::ALL.iter().map(|p| p.default_value()).collect(),
            master_volume: MAX_MIDI_VALUE,
            swap_stereo: false,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.volume.len()
    }

    pub fn fx_parameter(&self, parameter: FxParameter) -> u8 {
        self.fx_parameters
            .get(parameter.index())
            .copied()
            .unwrap_or_else(|| parameter.default_value())
    }

    pub fn send_level(&self, channel: usize, bus: Bus) -> u8 {
        self.send_levels[channel][bus.index()]
    }

    pub fn return_level(&self, from: Bus, to: Bus) -> u8 {
        assert!(!from.is_main(), "the main output has no return");
        self.return_levels[from.index()][to.index()]
    }
}
