//! Benchmarks for single effects, processing one chunk per iteration.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_console::fx::{
    Chorus, Delay, Effect, Flanger, Orbitone, Phaser, PlateReverb, Reverberator, Tube,
};

use crate::BLOCK_SIZES;

const SR: f32 = 48_000.0;

fn run(effect: &mut dyn Effect, input: &[f32]) -> f32 {
    let mut acc = 0.0;
    for &x in input {
        let (l, r) = effect.process_sample(x, x);
        acc += l + r;
    }
    acc
}

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("fx/effects");

    let mut effects: Vec<Box<dyn Effect>> = vec![
        Box::new(Tube::new(SR)),
        Box::new(Chorus::new(SR).expect("chorus")),
        Box::new(Flanger::new(SR).expect("flanger")),
        Box::new(Orbitone::new(SR).expect("orbitone")),
        Box::new(Phaser::new(SR)),
        Box::new(Delay::new(SR).expect("delay")),
        Box::new(PlateReverb::new(SR).expect("plate reverb")),
        Box::new(Reverberator::new(SR).expect("reverberator")),
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        for effect in effects.iter_mut() {
            let name = effect.name().replace(' ', "_");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| run(effect.as_mut(), black_box(&input)))
            });
        }
    }

    group.finish();
}
