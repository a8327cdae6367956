//! Benchmarks for a full console pass.
//!
//! Sixteen channels, every effect bus active, returns cross-fed the way a
//! dense patch would use them.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_console::{Bus, MixingConsole};

use crate::BLOCK_SIZES;

const CHANNELS: usize = 16;

fn loaded_console(buffer_size: usize) -> MixingConsole {
    let mut console = MixingConsole::new(48_000.0, buffer_size, CHANNELS).expect("console");
    for ch in 0..CHANNELS {
        console.set_channel_level(ch, 0.8);
        console.set_pan(ch, ch as f32 / (CHANNELS - 1) as f32);
        console.set_send_level(ch, Bus::MainOutput, 1.0);
        console.set_send_level(ch, Bus::FX[ch % Bus::FX_COUNT], 0.4);
    }
    for bus in Bus::FX {
        console.set_fx_send_level(bus, Bus::MainOutput, 0.6);
    }
    console.set_fx_send_level(Bus::Chorus, Bus::PlateReverb, 0.3);
    console.set_fx_send_level(Bus::Delay, Bus::Reverberator, 0.3);
    console
}

pub fn bench_console(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/console");

    for &size in BLOCK_SIZES {
        let inputs: Vec<Vec<f32>> = (0..CHANNELS)
            .map(|ch| {
                (0..size)
                    .map(|i| (i as f32 * (0.01 + ch as f32 * 0.003)).sin() * 0.3)
                    .collect()
            })
            .collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut console = loaded_console(size);
        group.bench_with_input(BenchmarkId::new("16ch_all_fx", size), &size, |b, _| {
            b.iter(|| {
                for (ch, input) in inputs.iter().enumerate() {
                    console.pre_process_input_sample_buffer(ch, Some(input.as_slice()), size);
                }
                console.process(black_box(&mut left), black_box(&mut right))
            })
        });

        let mut bypassed = loaded_console(size);
        bypassed.set_bypass(true);
        group.bench_with_input(BenchmarkId::new("16ch_bypassed", size), &size, |b, _| {
            b.iter(|| {
                for (ch, input) in inputs.iter().enumerate() {
                    bypassed.pre_process_input_sample_buffer(ch, Some(input.as_slice()), size);
                }
                bypassed.process(black_box(&mut left), black_box(&mut right))
            })
        });
    }

    group.finish();
}
