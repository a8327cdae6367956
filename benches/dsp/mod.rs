//! Benchmarks for low-level primitives and single effects.

mod arena;
mod effects;
mod mix;

pub use arena::bench_arena;
pub use effects::bench_effects;
pub use mix::bench_mix;
