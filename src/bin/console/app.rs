//! ConsoleApp - builds the engine, renders on its own thread, plays through cpal

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use saavy_console::{
    io::{converter::q15_to_float, RtrbSink},
    Bus, ConsoleEngine, EngineConfig, FxParameter,
};

use super::voice;

/// Chunks of headroom between the render thread and the device callback.
const QUEUE_CHUNKS: usize = 8;

pub struct ConsoleApp {
    voices: usize,
    cores: usize,
    chunk_size: usize,
    sends: Vec<(Bus, i32)>,
    returns: Vec<(Bus, i32)>,
    parameters: Vec<(FxParameter, i32)>,
}

impl ConsoleApp {
    pub fn new() -> Self {
        Self {
            voices: 8,
            cores: 1,
            chunk_size: 256,
            sends: Vec::new(),
            returns: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    /// Send every voice to `bus` at `level` (0-99).
    pub fn send(mut self, bus: Bus, level: i32) -> Self {
        self.sends.push((bus, level));
        self
    }

    /// Return `bus` to the main output at `level` (0-99).
    pub fn fx_return(mut self, bus: Bus, level: i32) -> Self {
        self.returns.push((bus, level));
        self
    }

    pub fn parameter(mut self, parameter: FxParameter, value: i32) -> Self {
        self.parameters.push((parameter, value));
        self
    }

    /// Run until the process is killed.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        println!("=== saavy-console ===");
        println!("Sample rate: {} Hz", sample_rate);
        println!("Device channels: {}", channels);
        println!("Voices: {} on {} core(s)", self.voices, self.cores);
        println!("Playing... Press Ctrl+C to stop");
        println!();

        let engine_config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_channels(self.voices)
            .with_cores(self.cores)
            .with_chunk_size(self.chunk_size);
        let mut engine = ConsoleEngine::new(engine_config, voice::chord(sample_rate, self.voices))
            .wrap_err("failed to build console engine")?;

        let control = engine.control();
        let spread = (self.voices - 1).max(1);
        for ch in 0..self.voices {
            control.set_pan(ch, (ch * 127 / spread) as i32);
            for &(bus, level) in &self.sends {
                control.set_send_level(ch, bus, level);
            }
        }
        for &(bus, level) in &self.returns {
            control.set_return_level(bus, Bus::MainOutput, level);
        }
        for &(parameter, value) in &self.parameters {
            control.set_parameter(parameter, value);
        }

        let chunk_samples = self.chunk_size * 2;
        let (producer, mut consumer) = RingBuffer::<i16>::new(chunk_samples * QUEUE_CHUNKS);
        let mut sink = RtrbSink::new(producer);

        let running = Arc::new(AtomicBool::new(true));
        let render_running = Arc::clone(&running);
        let chunk_size = self.chunk_size;
        let renderer = thread::Builder::new()
            .name("saavy-render".into())
            .spawn(move || {
                while render_running.load(Ordering::Relaxed) {
                    if sink.free_slots() >= chunk_samples {
                        engine.process_chunk(chunk_size, &mut sink);
                    } else {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
                log::info!("render thread stopped, {} chunks dropped", engine.dropped_chunks());
            })
            .wrap_err("failed to spawn render thread")?;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for frame in data.chunks_mut(channels) {
                    let (l, r) = if consumer.slots() >= 2 {
                        let l = consumer.pop().map(q15_to_float).unwrap_or(0.0);
                        let r = consumer.pop().map(q15_to_float).unwrap_or(0.0);
                        (l, r)
                    } else {
                        (0.0, 0.0)
                    };
                    // Stereo on the first pair, silence on any extra outputs.
                    for (ch, out) in frame.iter_mut().enumerate() {
                        *out = match ch {
                            0 => l,
                            1 => r,
                            _ => 0.0,
                        };
                    }
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        while !renderer.is_finished() {
            thread::sleep(Duration::from_millis(100));
        }
        running.store(false, Ordering::Relaxed);
        Err(eyre!("render thread exited unexpectedly"))
    }
}

impl Default for ConsoleApp {
    fn default() -> Self {
        Self::new()
    }
}
