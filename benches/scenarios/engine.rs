//! Benchmarks for the whole engine path: channel rendering on one or more
//! cores, console pass, master volume and 16-bit conversion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_console::io::VecSink;
use saavy_console::{Bus, ChannelSource, ConsoleEngine, EngineConfig};

use crate::BLOCK_SIZES;

const CHANNELS: usize = 8;

fn sines() -> Vec<Box<dyn ChannelSource>> {
    (0..CHANNELS)
        .map(|ch| {
            let increment = 0.02 + ch as f32 * 0.005;
            let mut phase = 0.0f32;
            Box::new(move |out: &mut [f32]| {
                for s in out.iter_mut() {
                    // A few extra partials so rendering is not free.
                    *s = 0.2 * (phase.sin() + 0.5 * (2.0 * phase).sin() + 0.25 * (3.0 * phase).sin());
                    phase = (phase + increment) % std::f32::consts::TAU;
                }
            }) as Box<dyn ChannelSource>
        })
        .collect()
}

fn engine(size: usize, cores: usize) -> ConsoleEngine {
    let config = EngineConfig::default()
        .with_channels(CHANNELS)
        .with_chunk_size(size)
        .with_cores(cores);
    let engine = ConsoleEngine::new(config, sines()).expect("engine");
    let control = engine.control();
    for ch in 0..CHANNELS {
        control.set_send_level(ch, Bus::Chorus, 30);
        control.set_send_level(ch, Bus::PlateReverb, 25);
    }
    control.set_return_level(Bus::Chorus, Bus::MainOutput, 80);
    control.set_return_level(Bus::PlateReverb, Bus::MainOutput, 70);
    engine
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        for cores in [1, 2] {
            let mut engine = engine(size, cores);
            let mut sink = VecSink::new();
            let id = format!("8ch_{}core", cores);
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| {
                    sink.clear();
                    engine.process_chunk(black_box(size), &mut sink)
                })
            });
        }
    }

    group.finish();
}
