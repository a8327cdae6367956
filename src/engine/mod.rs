//! Chunk pipeline: parallel channel rendering → console → master → sink.

pub mod scheduler;

pub use scheduler::{ChannelSource, CoreScheduler, CoreStatus};

use crate::console::MixingConsole;
use crate::control::{ConsoleControl, ConsoleState};
use crate::error::{ConsoleError, Result};
use crate::io::{interleave_q15, AudioSink};
use crate::MAX_BLOCK_SIZE;

/// Most cores a single engine will spread channels over.
pub const MAX_CORES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per chunk; also the upper bound for a single render call.
    pub chunk_size: usize,
    pub channels: usize,
    /// 1 renders every channel on the calling thread.
    pub cores: usize,
    pub swap_stereo: bool,
    /// Linear gain in [0, 1].
    pub master_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            chunk_size: 256,
            channels: 8,
            cores: 1,
            swap_stereo: false,
            master_volume: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_swap_stereo(mut self, swap: bool) -> Self {
        self.swap_stereo = swap;
        self
    }

    pub fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConsoleError::InvalidConfig(msg));

        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return invalid(format!("sample rate {} is not positive", self.sample_rate));
        }
        if self.chunk_size == 0 || self.chunk_size > MAX_BLOCK_SIZE {
            return invalid(format!(
                "chunk size {} outside 1..={}",
                self.chunk_size, MAX_BLOCK_SIZE
            ));
        }
        if self.channels == 0 {
            return invalid("at least one channel is required".into());
        }
        if self.cores == 0 || self.cores > MAX_CORES {
            return invalid(format!("core count {} outside 1..={}", self.cores, MAX_CORES));
        }
        if self.cores > self.channels {
            return invalid(format!(
                "{} cores for only {} channels",
                self.cores, self.channels
            ));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return invalid(format!("master volume {} outside [0, 1]", self.master_volume));
        }
        Ok(())
    }
}

pub struct ConsoleEngine {
    config: EngineConfig,
    scheduler: CoreScheduler,
    control: ConsoleControl,

    left: Vec<f32>,
    right: Vec<f32>,
    interleaved: Vec<f32>,
    pcm: Vec<i16>,

    dropped_chunks: u64,
}

impl ConsoleEngine {
    /// One source per channel, in channel order.
    pub fn new(config: EngineConfig, sources: Vec<Box<dyn ChannelSource>>) -> Result<Self> {
        config.validate()?;
        if sources.len() != config.channels {
            return Err(ConsoleError::InvalidConfig(format!(
                "{} sources for {} channels",
                sources.len(),
                config.channels
            )));
        }

        let console = MixingConsole::new(config.sample_rate, config.chunk_size, config.channels)?;
        let mut state = ConsoleState::new(console);
        state.set_master_gain(config.master_volume);
        state.set_swap_stereo(config.swap_stereo);

        let scheduler = CoreScheduler::new(sources, config.cores, config.chunk_size)?;
        let chunk = config.chunk_size;

        log::info!(
            "console engine: {} channels on {} core(s), {} frames @ {} Hz",
            config.channels,
            config.cores,
            config.chunk_size,
            config.sample_rate
        );

        Ok(Self {
            config,
            scheduler,
            control: ConsoleControl::new(state),
            left: vec![0.0; chunk],
            right: vec![0.0; chunk],
            interleaved: vec![0.0; chunk * 2],
            pcm: vec![0; chunk * 2],
            dropped_chunks: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle for the control thread.
    pub fn control(&self) -> ConsoleControl {
        self.control.clone()
    }

    /// Chunks a sink refused so far.
    pub fn dropped_chunks(&self) -> u64 {
        self.dropped_chunks
    }

    fn clamp_frames(&self, frames: usize) -> usize {
        if frames > self.config.chunk_size {
            log::warn!(
                "requested {} frames, truncating to chunk size {}",
                frames,
                self.config.chunk_size
            );
            self.config.chunk_size
        } else {
            frames
        }
    }

    /// Render into the split scratch buffers with master volume applied.
    fn render_split(&mut self, frames: usize) {
        self.scheduler.render(frames);

        let master = {
            let mut state = self.control.lock();
            let console = state.console_mut();
            self.scheduler.for_each_channel(|channel, buffer| {
                console.pre_process_input_sample_buffer(channel, Some(buffer), frames);
            });
            console.process(&mut self.left[..frames], &mut self.right[..frames]);
            state.master_volume()
        };

        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        if master == 0.0 {
            left.fill(0.0);
            right.fill(0.0);
        } else if master != 1.0 {
            left.iter_mut().for_each(|s| *s *= master);
            right.iter_mut().for_each(|s| *s *= master);
        }
    }

    /// Render one chunk to interleaved float frames.
    pub fn render(&mut self, frames: usize) -> &[f32] {
        let frames = self.clamp_frames(frames);
        self.render_split(frames);

        for ((frame, &l), &r) in self
            .interleaved
            .chunks_exact_mut(2)
            .zip(&self.left[..frames])
            .zip(&self.right[..frames])
        {
            frame[0] = l;
            frame[1] = r;
        }
        &self.interleaved[..frames * 2]
    }

    /// Render one chunk and hand it to `sink` as 16-bit frames.
    ///
    /// Returns the frames written; 0 when the sink refused the chunk.
    pub fn process_chunk(&mut self, frames: usize, sink: &mut dyn AudioSink) -> usize {
        let frames = self.clamp_frames(frames);
        self.render_split(frames);

        interleave_q15(&self.left[..frames], &self.right[..frames], &mut self.pcm);
        let samples = &self.pcm[..frames * 2];
        let written = sink.write(samples);
        if written < samples.len() {
            self.dropped_chunks += 1;
            log::error!(
                "audio sink accepted {} of {} samples, chunk dropped ({} total)",
                written,
                samples.len(),
                self.dropped_chunks
            );
            return 0;
        }
        frames
    }
}
