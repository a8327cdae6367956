//! Realtime mixing console for a polyphonic synth voice engine.
//!
//! Channels are rendered in parallel by [`engine::CoreScheduler`], panned and
//! routed through eight effect buses by [`console::MixingConsole`], and
//! delivered to an [`io::AudioSink`] as interleaved 16-bit frames. The
//! control thread drives everything through [`control::ConsoleControl`].

pub mod console;
pub mod control;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod fx;
pub mod io;

pub use console::{Bus, MixingConsole};
pub use control::{ConsoleControl, FxParameter, MixerPerformance};
pub use engine::{ChannelSource, ConsoleEngine, EngineConfig};
pub use error::{ConsoleError, Result};

/// Largest chunk any engine will render in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;
