//! Low-level DSP primitives used by the effect units and the console.
//!
//! These components are allocation-free once constructed and realtime-safe.
//! They stay focused on signal math; routing and parameter handling live in
//! the console and effect layers.

/// Delay arena: shared circular memory carved into named delay lines.
pub mod arena;
/// Storage formats for delay memory.
pub mod codec;
/// Waveshaping curves.
pub mod distortion;
/// Free-running modulation oscillators.
pub mod lfo;
/// Pan laws, weighted sums and dry/wet blending.
pub mod mix;

pub use arena::{ArenaLayout, Context, DelayArena, LfoIndex, Reserve, Segment, TAIL};
pub use codec::{Fixed12, Fixed16, Fixed32, Float32, SampleCodec, SampleFormat};
pub use lfo::Lfo;
