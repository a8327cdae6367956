//! Full-pipeline benchmarks.
//!
//! These model what the render thread does every chunk: a console pass over
//! all channels and buses, and the complete engine path down to 16-bit frames.

mod console;
mod engine;

pub use console::bench_console;
pub use engine::bench_engine;
