//! Construction-time errors.
//!
//! Only configuration problems surface as values. Index violations on the
//! render path are programming errors and panic through assertions instead.

use thiserror::Error;

/// Errors raised while building arenas, effects, consoles and engines.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("arena capacity {capacity} is not a power of two")]
    CapacityNotPowerOfTwo { capacity: usize },

    #[error("segment '{name}' ends at {end} which exceeds arena capacity {capacity}")]
    ArenaOverflow {
        name: &'static str,
        end: usize,
        capacity: usize,
    },

    #[error("segment '{name}' has zero length")]
    EmptySegment { name: &'static str },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn render worker {core}: {source}")]
    WorkerSpawn {
        core: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
