//! Benchmarks for routing math.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_console::dsp::mix;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    // 16 channels + 8 returns, roughly a third of the routes active.
    let weights: Vec<f32> = (0..24)
        .map(|i| if i % 3 == 0 { 0.5 } else { 0.0 })
        .collect();

    for &size in BLOCK_SIZES {
        let frames: Vec<Vec<f32>> = (0..size)
            .map(|n| (0..24).map(|i| ((n * 24 + i) as f32 * 0.01).sin()).collect())
            .collect();

        group.bench_with_input(BenchmarkId::new("weighted_sum", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for sources in &frames {
                    acc += mix::weighted_sum(black_box(&weights), black_box(sources));
                }
                acc
            })
        });

        let signal: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("pan_scale", size), &size, |b, _| {
            b.iter(|| {
                let (l, _) = mix::constant_power_gains(black_box(0.3), black_box(0.8));
                mix::scale_into(black_box(&signal), l, black_box(&mut output));
            })
        });
    }

    group.finish();
}
