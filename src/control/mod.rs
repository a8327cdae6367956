//! Integer control surface and persisted mixer state.
//!
//! The control thread (UI, MIDI, patch loading) never touches the console's
//! float parameters directly. It sends integers in application ranges
//! through [`ConsoleControl`], which clamps them, records them in the
//! [`MixerPerformance`], maps them onto the console's scale and applies them,
//! all under the same lock the render path takes once per chunk.
//!
//! ```text
//!   control thread                         render thread
//!   ──────────────                         ─────────────
//!   set_send_level(ch, Delay, 40)
//!     lock ──────────┐
//!     clamp → 40     │                      process_chunk()
//!     perf = 40      │                        lock (waits) ─┐
//!     console = 0.40 │                                      │
//!     unlock ────────┘                                      │
//!                                             process(...)  │
//!                                             unlock ───────┘
//! ```

mod parameter;
mod performance;

pub use parameter::FxParameter;
pub use performance::{MixerPerformance, MAX_LEVEL_VALUE, MAX_MIDI_VALUE};

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::console::{Bus, MixingConsole};

#[inline]
fn midi_value(value: i32) -> u8 {
    value.clamp(0, MAX_MIDI_VALUE as i32) as u8
}

#[inline]
fn level_value(value: i32) -> u8 {
    value.clamp(0, MAX_LEVEL_VALUE as i32) as u8
}

/// Everything guarded by the FX lock.
pub struct ConsoleState {
    console: MixingConsole,
    performance: MixerPerformance,
    master_volume: f32,
}

impl ConsoleState {
    /// Wrap a console and load the stock performance into it.
    pub fn new(console: MixingConsole) -> Self {
        let performance = MixerPerformance::new(console.channel_count());
        let mut state = Self {
            console,
            performance: performance.clone(),
            master_volume: 1.0,
        };
        state.apply(&performance);
        state
    }

    pub fn console(&self) -> &MixingConsole {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut MixingConsole {
        &mut self.console
    }

    pub fn performance(&self) -> &MixerPerformance {
        &self.performance
    }

    /// Linear master gain in [0, 1].
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_channel_volume(&mut self, channel: usize, value: i32) {
        let value = midi_value(value);
        self.performance.volume[channel] = value;
        self.console
            .set_channel_level(channel, value as f32 / MAX_MIDI_VALUE as f32);
        log::debug!("channel {} volume {}", channel, value);
    }

    pub fn set_pan(&mut self, channel: usize, value: i32) {
        let value = midi_value(value);
        self.performance.pan[channel] = value;
        self.console
            .set_pan(channel, value as f32 / MAX_MIDI_VALUE as f32);
        log::debug!("channel {} pan {}", channel, value);
    }

    pub fn set_send_level(&mut self, channel: usize, bus: Bus, value: i32) {
        let value = level_value(value);
        self.performance.send_levels[channel][bus.index()] = value;
        self.console
            .set_send_level(channel, bus, value as f32 / MAX_LEVEL_VALUE as f32);
        log::debug!("channel {} -> {} send {}", channel, bus, value);
    }

    /// Route an effect return into another bus. A bus never feeds itself, so
    /// a self-send is stored as 0.
    pub fn set_return_level(&mut self, from: Bus, to: Bus, value: i32) {
        assert!(!from.is_main(), "the main output has no return");
        let value = if from == to { 0 } else { level_value(value) };
        self.performance.return_levels[from.index()][to.index()] = value;
        self.console
            .set_fx_send_level(from, to, value as f32 / MAX_LEVEL_VALUE as f32);
        log::debug!("{} -> {} return {}", from, to, value);
    }

    pub fn set_master_volume(&mut self, value: i32) {
        let value = midi_value(value);
        self.performance.master_volume = value;
        self.master_volume = value as f32 / MAX_MIDI_VALUE as f32;
        log::debug!("master volume {}", value);
    }

    /// Set the linear master gain directly, keeping the stored integer in
    /// step.
    pub fn set_master_gain(&mut self, gain: f32) {
        let gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
        self.master_volume = gain;
        self.performance.master_volume = (gain * MAX_MIDI_VALUE as f32).round() as u8;
    }

    pub fn set_parameter(&mut self, parameter: FxParameter, value: i32) {
        let value = parameter.clamp(value);
        self.performance.fx_parameters[parameter.index()] = value;
        parameter.apply(self.console.fx_mut(), value);
        log::debug!("{:?} = {}", parameter, value);
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.console.set_bypass(bypass);
    }

    pub fn set_swap_stereo(&mut self, swap: bool) {
        self.performance.swap_stereo = swap;
        self.console.swap_stereo_image(swap);
    }

    /// Load every field of `performance` through the clamping setters.
    ///
    /// Channels beyond the console's count are ignored; missing ones keep
    /// their current values.
    pub fn apply(&mut self, performance: &MixerPerformance) {
        let channels = self
            .console
            .channel_count()
            .min(performance.volume.len())
            .min(performance.pan.len())
            .min(performance.send_levels.len());

        for ch in 0..channels {
            self.set_channel_volume(ch, performance.volume[ch] as i32);
            self.set_pan(ch, performance.pan[ch] as i32);
            for bus in Bus::ALL {
                self.set_send_level(ch, bus, performance.send_level(ch, bus) as i32);
            }
        }
        for from in Bus::FX {
            for to in Bus::ALL {
                self.set_return_level(from, to, performance.return_level(from, to) as i32);
            }
        }
        for parameter in FxParameter::ALL {
            self.set_parameter(parameter, performance.fx_parameter(parameter) as i32);
        }
        self.set_master_volume(performance.master_volume as i32);
        self.set_swap_stereo(performance.swap_stereo);
    }
}

/// Cloneable handle to the console for the control thread.
#[derive(Clone)]
pub struct ConsoleControl {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleControl {
    pub fn new(state: ConsoleState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Take the FX lock. Hold it briefly: the render path waits on it.
    pub fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock()
    }

    pub fn set_channel_volume(&self, channel: usize, value: i32) {
        self.lock().set_channel_volume(channel, value);
    }

    pub fn channel_volume(&self, channel: usize) -> u8 {
        self.lock().performance.volume[channel]
    }

    pub fn set_pan(&self, channel: usize, value: i32) {
        self.lock().set_pan(channel, value);
    }

    pub fn pan(&self, channel: usize) -> u8 {
        self.lock().performance.pan[channel]
    }

    pub fn set_send_level(&self, channel: usize, bus: Bus, value: i32) {
        self.lock().set_send_level(channel, bus, value);
    }

    pub fn send_level(&self, channel: usize, bus: Bus) -> u8 {
        self.lock().performance.send_level(channel, bus)
    }

    pub fn set_return_level(&self, from: Bus, to: Bus, value: i32) {
        self.lock().set_return_level(from, to, value);
    }

    pub fn return_level(&self, from: Bus, to: Bus) -> u8 {
        self.lock().performance.return_level(from, to)
    }

    pub fn set_master_volume(&self, value: i32) {
        self.lock().set_master_volume(value);
    }

    pub fn master_volume(&self) -> u8 {
        self.lock().performance.master_volume
    }

    pub fn set_parameter(&self, parameter: FxParameter, value: i32) {
        self.lock().set_parameter(parameter, value);
    }

    pub fn parameter(&self, parameter: FxParameter) -> u8 {
        self.lock().performance.fx_parameter(parameter)
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.lock().set_bypass(bypass);
    }

    pub fn is_bypassed(&self) -> bool {
        self.lock().console.is_bypassed()
    }

    pub fn set_swap_stereo(&self, swap: bool) {
        self.lock().set_swap_stereo(swap);
    }

    pub fn snapshot(&self) -> MixerPerformance {
        self.lock().performance.clone()
    }

    pub fn apply(&self, performance: &MixerPerformance) {
        self.lock().apply(performance);
        log::info!(
            "applied performance ({} channels)",
            performance.channel_count()
        );
    }
}
