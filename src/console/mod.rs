//! Mixing console: the routing matrix between channels, effect buses and
//! the main output.

/*
Routing Matrix
==============

Sources are the N input channels followed by the returns of the eight
effect buses. Destinations are those eight buses plus the main output.
A level matrix holds one gain per (destination, source):

                  ch0   ch1  ...  chN-1 │ Tube  Chorus ... Reverberator
                ┌───────────────────────┼─────────────────────────────
    Tube        │ 0.0   0.2        0.0  │  --   0.0         0.0
    Chorus      │ 0.5   0.0        0.0  │ 0.0    --         0.0
    ...         │                       │
    Delay       │ 0.0   0.0        0.3  │ 0.0   0.0         0.4   ← reverb into delay
    ...         │                       │
    MainOutput  │ 1.0   1.0        1.0  │ 0.0   0.7         0.5
                                                 (-- : a bus never feeds itself)

Per Sample
----------

For every bus in order, left and right are mixed independently:

    in  = Σ level[bus][src] · sample[src]        (NaN → 0)
    out = slot[bus].process(in)

A bus output becomes that bus's return sample for the NEXT sample. All nine
weighted sums of one sample see the same source vector, so feedback between
buses (reverb → delay → reverb) always goes through a one-sample delay and
the result does not depend on which bus happens to come first.

The main output's processed sum is the frame.

Channel Strips
--------------

Channels arrive as mono buffers. Before a chunk is processed each one is
split into a stereo pair with its constant-power pan gains (level folded in),
then the per-sample loop pushes sample `s` of every channel into the source
vector before running the buses.
*/

mod bus;
mod rack;

pub use bus::Bus;
pub use rack::FxRack;

use crate::dsp::mix::{constant_power_gains, scale_into, weighted_sum};
use crate::error::{ConsoleError, Result};
use crate::fx::EffectSlot;

pub struct MixingConsole {
    sample_rate: f32,
    buffer_size: usize,
    channels: usize,
    bypass: bool,
    swap_stereo: bool,

    channel_level: Vec<f32>,
    pan: Vec<f32>,
    pan_gains: Vec<(f32, f32)>,

    input_buffer_l: Vec<Vec<f32>>,
    input_buffer_r: Vec<Vec<f32>>,
    pending_samples: usize,

    samples_l: Vec<f32>,
    samples_r: Vec<f32>,
    returns_l: [f32; Bus::FX_COUNT],
    returns_r: [f32; Bus::FX_COUNT],

    levels: Vec<f32>,
    rack: FxRack,
}

impl MixingConsole {
    /// Build a console for `channels` inputs rendering chunks of at most
    /// `buffer_size` samples.
    pub fn new(sample_rate: f32, buffer_size: usize, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(ConsoleError::InvalidConfig(
                "console needs at least one channel".into(),
            ));
        }
        if buffer_size == 0 {
            return Err(ConsoleError::InvalidConfig(
                "console buffer size must be non-zero".into(),
            ));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConsoleError::InvalidConfig(format!(
                "invalid sample rate {}",
                sample_rate
            )));
        }

        let sources = channels + Bus::FX_COUNT;
        let mut rack = FxRack::new(sample_rate)?;
        for bus in Bus::ALL {
            rack.slot_mut(bus).set_bypass(true);
        }

        let mut console = Self {
            sample_rate,
            buffer_size,
            channels,
            bypass: true,
            swap_stereo: false,
            channel_level: vec![0.0; channels],
            pan: vec![0.0; channels],
            pan_gains: vec![(0.0, 0.0); channels],
            input_buffer_l: vec![vec![0.0; buffer_size]; channels],
            input_buffer_r: vec![vec![0.0; buffer_size]; channels],
            pending_samples: 0,
            samples_l: vec![0.0; sources],
            samples_r: vec![0.0; sources],
            returns_l: [0.0; Bus::FX_COUNT],
            returns_r: [0.0; Bus::FX_COUNT],
            levels: vec![0.0; Bus::COUNT * sources],
            rack,
        };
        console.set_bypass(false);
        console.init();
        Ok(console)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    #[inline]
    fn source_count(&self) -> usize {
        self.channels + Bus::FX_COUNT
    }

    #[inline]
    fn return_source(&self, bus: Bus) -> usize {
        assert!(!bus.is_main(), "the main output has no return");
        self.channels + bus.index()
    }

    #[inline]
    fn assert_channel(&self, channel: usize) {
        assert!(
            channel < self.channels,
            "channel {} out of range ({} channels)",
            channel,
            self.channels
        );
    }

    // Bypass

    /// Bypass every bus. Leaving bypass fully resets the console so no stale
    /// delay memory or return sample leaks into the resumed signal.
    pub fn set_bypass(&mut self, bypass: bool) {
        if self.bypass == bypass {
            return;
        }
        self.bypass = bypass;
        for bus in Bus::ALL {
            self.rack.slot_mut(bus).set_bypass(bypass);
        }
        if !bypass {
            self.reset();
        }
        log::debug!("console bypass {}", if bypass { "on" } else { "off" });
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    // Send section

    /// Channel level in [0, 1]. No-op when unchanged.
    pub fn set_channel_level(&mut self, channel: usize, level: f32) {
        self.assert_channel(channel);
        let level = level.clamp(0.0, 1.0);
        if level == self.channel_level[channel] {
            return;
        }
        self.channel_level[channel] = level;
        self.update_pan(channel);
    }

    pub fn channel_level(&self, channel: usize) -> f32 {
        self.assert_channel(channel);
        self.channel_level[channel]
    }

    /// Pan in [0, 1], 0 hard left. No-op when unchanged.
    pub fn set_pan(&mut self, channel: usize, pan: f32) {
        self.assert_channel(channel);
        let pan = pan.clamp(0.0, 1.0);
        if pan == self.pan[channel] {
            return;
        }
        self.pan[channel] = pan;
        self.update_pan(channel);
    }

    pub fn pan(&self, channel: usize) -> f32 {
        self.assert_channel(channel);
        self.pan[channel]
    }

    /// Left/right gains of a channel strip, level included.
    pub fn channel_gains(&self, channel: usize) -> (f32, f32) {
        self.assert_channel(channel);
        self.pan_gains[channel]
    }

    fn update_pan(&mut self, channel: usize) {
        self.pan_gains[channel] =
            constant_power_gains(self.pan[channel], self.channel_level[channel]);
    }

    pub fn swap_stereo_image(&mut self, swap: bool) {
        self.swap_stereo = swap;
    }

    pub fn is_stereo_swapped(&self) -> bool {
        self.swap_stereo
    }

    /// Gain from `channel` into `bus`, clamped to [0, 1].
    pub fn set_send_level(&mut self, channel: usize, bus: Bus, level: f32) {
        self.assert_channel(channel);
        self.set_level(bus, channel, level);
    }

    pub fn send_level(&self, channel: usize, bus: Bus) -> f32 {
        self.assert_channel(channel);
        self.level(bus, channel)
    }

    /// Gain from one bus's return into another bus, clamped to [0, 1].
    ///
    /// A bus sending to itself is ignored.
    pub fn set_fx_send_level(&mut self, from: Bus, to: Bus, level: f32) {
        let source = self.return_source(from);
        if from == to {
            return;
        }
        self.set_level(to, source, level);
    }

    pub fn fx_send_level(&self, from: Bus, to: Bus) -> f32 {
        self.level(to, self.return_source(from))
    }

    fn set_level(&mut self, bus: Bus, source: usize, level: f32) {
        let sources = self.source_count();
        assert!(source < sources);
        self.levels[bus.index() * sources + source] = level.clamp(0.0, 1.0);
    }

    /// Raw matrix entry. `source` indexes channels first, then bus returns.
    pub fn level(&self, bus: Bus, source: usize) -> f32 {
        let sources = self.source_count();
        assert!(source < sources, "source {} out of range", source);
        self.levels[bus.index() * sources + source]
    }

    /// Live stereo pair of a channel for the next weighted sum.
    pub fn set_input_sample(&mut self, channel: usize, left: f32, right: f32) {
        self.assert_channel(channel);
        self.samples_l[channel] = left;
        self.samples_r[channel] = right;
    }

    /// Live return pair of an effect bus for the next weighted sum.
    pub fn set_return_sample(&mut self, bus: Bus, left: f32, right: f32) {
        let source = self.return_source(bus);
        self.samples_l[source] = left;
        self.samples_r[source] = right;
    }

    /// Last return produced by `bus`.
    pub fn return_sample(&self, bus: Bus) -> (f32, f32) {
        let source = self.return_source(bus);
        (self.samples_l[source], self.samples_r[source])
    }

    // Effects

    pub fn fx(&self) -> &FxRack {
        &self.rack
    }

    pub fn fx_mut(&mut self) -> &mut FxRack {
        &mut self.rack
    }

    pub fn slot_mut(&mut self, bus: Bus) -> &mut dyn EffectSlot {
        self.rack.slot_mut(bus)
    }

    // Processing

    /// Zero levels, pans and the matrix, then [`reset`](Self::reset).
    pub fn init(&mut self) {
        self.channel_level.fill(0.0);
        self.pan.fill(0.0);
        self.pan_gains.fill((0.0, 0.0));
        self.levels.fill(0.0);
        self.samples_l.fill(0.0);
        self.samples_r.fill(0.0);
        self.reset();
    }

    /// Clear channel buffers, effect state and return samples.
    pub fn reset(&mut self) {
        for buffer in self
            .input_buffer_l
            .iter_mut()
            .chain(self.input_buffer_r.iter_mut())
        {
            buffer.fill(0.0);
        }
        for bus in Bus::ALL {
            self.rack.slot_mut(bus).reset();
        }
        for bus in Bus::FX {
            self.set_return_sample(bus, 0.0, 0.0);
        }
        self.returns_l = [0.0; Bus::FX_COUNT];
        self.returns_r = [0.0; Bus::FX_COUNT];
    }

    /// Pan a channel's mono chunk into its stereo scratch buffers.
    ///
    /// `None` means the channel is silent for this chunk.
    pub fn pre_process_input_sample_buffer(
        &mut self,
        channel: usize,
        samples: Option<&[f32]>,
        frames: usize,
    ) {
        self.assert_channel(channel);
        assert!(
            frames <= self.buffer_size,
            "chunk of {} frames exceeds buffer size {}",
            frames,
            self.buffer_size
        );
        self.pending_samples = frames;

        let left = &mut self.input_buffer_l[channel];
        let right = &mut self.input_buffer_r[channel];
        if frames == 0 {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let Some(samples) = samples else {
            left[..frames].fill(0.0);
            right[..frames].fill(0.0);
            return;
        };
        assert!(samples.len() >= frames);

        let (gain_l, gain_r) = self.pan_gains[channel];
        let input = &samples[..frames];
        if gain_l != 0.0 {
            scale_into(input, gain_l, &mut left[..frames]);
        } else {
            left[..frames].fill(0.0);
        }
        if gain_r != 0.0 {
            scale_into(input, gain_r, &mut right[..frames]);
        } else {
            right[..frames].fill(0.0);
        }
    }

    /// Copy an already-stereo chunk into a channel, bypassing its pan.
    ///
    /// `None` on either side means silence on that side. `frames` is capped
    /// to the buffer size.
    pub fn inject_input_samples(
        &mut self,
        channel: usize,
        left: Option<&[f32]>,
        right: Option<&[f32]>,
        frames: usize,
    ) {
        self.assert_channel(channel);
        let frames = frames.min(self.buffer_size);
        self.pending_samples = frames;

        for (src, dst) in [
            (left, &mut self.input_buffer_l[channel]),
            (right, &mut self.input_buffer_r[channel]),
        ] {
            match src {
                Some(src) => dst[..frames].copy_from_slice(&src[..frames]),
                None => dst[..frames].fill(0.0),
            }
        }
    }

    /// Samples waiting in the channel buffers for the next `process` call.
    pub fn pending_samples(&self) -> usize {
        self.pending_samples
    }

    /// Run every bus once on the current source vector and return the main
    /// output frame.
    #[inline]
    pub fn process_sample(&mut self) -> (f32, f32) {
        let sources = self.source_count();
        let mut main = (0.0, 0.0);

        for bus in Bus::ALL {
            let row = &self.levels[bus.index() * sources..(bus.index() + 1) * sources];
            let in_l = weighted_sum(row, &self.samples_l);
            let in_r = weighted_sum(row, &self.samples_r);

            let (out_l, out_r) = self.rack.slot_mut(bus).process_sample(in_l, in_r);
            if bus.is_main() {
                main = (out_l, out_r);
            } else {
                self.returns_l[bus.index()] = out_l;
                self.returns_r[bus.index()] = out_r;
            }
        }

        // Publish this sample's returns for the next one.
        self.samples_l[self.channels..].copy_from_slice(&self.returns_l);
        self.samples_r[self.channels..].copy_from_slice(&self.returns_r);

        main
    }

    #[inline]
    fn load_inputs(&mut self, index: usize) {
        for ch in 0..self.channels {
            self.samples_l[ch] = self.input_buffer_l[ch][index];
            self.samples_r[ch] = self.input_buffer_r[ch][index];
        }
    }

    /// Process the pending chunk into split left/right buffers.
    ///
    /// Returns the number of frames written.
    pub fn process(&mut self, out_l: &mut [f32], out_r: &mut [f32]) -> usize {
        let frames = self.pending_samples;
        assert!(out_l.len() >= frames && out_r.len() >= frames);

        for s in 0..frames {
            self.load_inputs(s);
            let (l, r) = self.process_sample();
            if self.swap_stereo {
                out_l[s] = r;
                out_r[s] = l;
            } else {
                out_l[s] = l;
                out_r[s] = r;
            }
        }

        self.pending_samples = 0;
        frames
    }

    /// Process the pending chunk into an interleaved `[L, R, L, R, ...]`
    /// buffer. Returns the number of frames written.
    pub fn process_interleaved(&mut self, out: &mut [f32]) -> usize {
        let frames = self.pending_samples;
        assert!(out.len() >= frames * 2);

        for (s, frame) in out.chunks_exact_mut(2).take(frames).enumerate() {
            self.load_inputs(s);
            let (l, r) = self.process_sample();
            if self.swap_stereo {
                frame[0] = r;
                frame[1] = l;
            } else {
                frame[0] = l;
                frame[1] = r;
            }
        }

        self.pending_samples = 0;
        frames
    }
}
