//! Benchmarks for delay arena access through a context.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_console::dsp::{
    ArenaLayout, DelayArena, Fixed16, Float32, LfoIndex, Lfo, Reserve, SampleCodec, TAIL,
};

use crate::BLOCK_SIZES;

const LAYOUT: [Reserve; 3] = [
    Reserve::new("ap", 241),
    Reserve::new("line", 3000),
    Reserve::new("mod", 1200),
];

fn arena<C: SampleCodec>() -> DelayArena<C> {
    let layout = ArenaLayout::new(8192, &LAYOUT).expect("layout fits");
    DelayArena::new(layout).with_lfos(
        Lfo::new(48_000.0, 0.5, 0.5),
        Lfo::new(48_000.0, 0.3, 0.3),
    )
}

/// All-pass, plain delay tap and modulated read: the usual reverb inner loop.
fn run<C: SampleCodec>(arena: &mut DelayArena<C>, input: &[f32], out: &mut [f32]) {
    let ap = arena.segment(0);
    let line = arena.segment(1);
    let modulated = arena.segment(2);
    for (x, y) in input.iter().zip(out.iter_mut()) {
        let mut c = arena.start();
        c.load(*x);
        c.read(ap, TAIL, 0.6);
        c.write_all_pass(ap, 0, -0.6);
        c.read(line, TAIL, 0.5);
        c.write(line, 0, 0.0);
        c.interpolate_lfo(modulated, 600.0, LfoIndex::Lfo1, 100.0, 1.0);
        c.write(modulated, 0, 0.0);
        *y = c.accumulator();
    }
}

pub fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/arena");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();
        let mut output = vec![0.0f32; size];

        let mut fixed16 = arena::<Fixed16>();
        group.bench_with_input(BenchmarkId::new("fixed16", size), &size, |b, _| {
            b.iter(|| run(&mut fixed16, black_box(&input), black_box(&mut output)))
        });

        let mut float32 = arena::<Float32>();
        group.bench_with_input(BenchmarkId::new("float32", size), &size, |b, _| {
            b.iter(|| run(&mut float32, black_box(&input), black_box(&mut output)))
        });
    }

    group.finish();
}
